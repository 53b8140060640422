use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{Key, ModifiersState},
    window::{Window, WindowId},
};

use crate::args::LoopArgs;
use crate::config::{ViewSettings, WindowConfig};
use crate::error::EngineError;
use crate::render::draw::DrawList;
use crate::render::graphics::{create_graphics, Graphics, RenderOptions};
use crate::simulation::{Flow, LoopControl, PauseState, Simulation};

enum State {
    Ready(Graphics),
    Init(Option<EventLoopProxy<Graphics>>),
}

/// Owns the window event loop and runs a [`Simulation`] inside it.
pub struct EngineContext {
    config: WindowConfig,
    args: LoopArgs,
    event_loop: EventLoop<Graphics>,
}

struct App<S> {
    state: State,
    sim: S,
    config: WindowConfig,
    args: LoopArgs,
    view: ViewSettings,
    pause: PauseState,
    frame: DrawList,
    modifiers: ModifiersState,
    started: bool,
    exiting: bool,
    error: Option<EngineError>,
}

impl<S: Simulation> App<S> {
    fn new(
        event_loop: &EventLoop<Graphics>,
        sim: S,
        config: WindowConfig,
        args: LoopArgs,
    ) -> Self {
        Self {
            state: State::Init(Some(event_loop.create_proxy())),
            sim,
            config,
            args,
            view: ViewSettings::default(),
            pause: PauseState::new(args.start_paused),
            frame: DrawList::new(),
            modifiers: ModifiersState::empty(),
            started: false,
            exiting: false,
            error: None,
        }
    }

    fn draw(&mut self) {
        if self.exiting {
            return;
        }
        if let State::Ready(gfx) = &mut self.state {
            let paused = self.pause.next_frame();
            self.frame.clear();
            self.sim.on_frame(paused, &mut self.frame);
            gfx.draw(&self.view, &self.frame);
            gfx.request_redraw();
        }
    }

    fn resized(&mut self, size: PhysicalSize<u32>) {
        if let State::Ready(gfx) = &mut self.state {
            gfx.resize(size);
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: EngineError) {
        log::error!("{error}");
        self.error = Some(error);
        self.exit(event_loop);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exiting = true;
        event_loop.exit();
    }

    fn key_pressed(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let Key::Character(text) = &event.logical_key else {
            return;
        };
        let flow = if self.modifiers.control_key() {
            match text.to_lowercase().as_str() {
                "p" => self.pause.apply(LoopControl::TogglePause),
                "o" => self.pause.apply(LoopControl::SingleStep),
                "x" => self.pause.apply(LoopControl::Exit),
                _ => Flow::Continue,
            }
        } else {
            let mut flow = Flow::Continue;
            for key in text.chars() {
                flow = self.sim.on_command(key);
                if flow == Flow::Exit {
                    break;
                }
            }
            flow
        };
        if flow == Flow::Exit {
            self.exit(event_loop);
        }
    }
}

impl<S: Simulation> ApplicationHandler<Graphics> for App<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let State::Init(proxy) = &mut self.state else {
            return;
        };
        let Some(proxy) = proxy.take() else {
            return;
        };

        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };

        let options = RenderOptions {
            textures: self.args.textures,
            texture_dir: self.config.textures.clone(),
            ground_scale: self.config.ground_scale,
        };
        if let Err(err) = pollster::block_on(create_graphics(window, proxy, options)) {
            self.fail(event_loop, err);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        if !self.started {
            self.sim.on_start(&mut self.view);
            self.started = true;
        }
        // Request a redraw now that graphics are ready
        graphics.request_redraw();
        self.state = State::Ready(graphics);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::Resized(size) => self.resized(size),
            WindowEvent::RedrawRequested => self.draw(),
            WindowEvent::CloseRequested => self.exit(event_loop),
            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                self.key_pressed(event_loop, &event)
            }
            _ => {}
        }
    }
}

impl EngineContext {
    pub fn new(config: WindowConfig, args: LoopArgs) -> Result<Self, EngineError> {
        let event_loop = EventLoop::<Graphics>::with_user_event().build()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        Ok(Self {
            config,
            args,
            event_loop,
        })
    }

    /// Run `sim` until the window closes or the simulation asks to exit.
    pub fn run<S: Simulation>(self, sim: S) -> Result<(), EngineError> {
        let mut app = App::new(&self.event_loop, sim, self.config, self.args);
        self.event_loop.run_app(&mut app)?;
        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Initialise `env_logger` with `default_filter`, e.g. `"warn,my_sim=info"`. `RUST_LOG`
/// overrides it, which also lets wgpu logs be seen.
pub fn init_logging(default_filter: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}
