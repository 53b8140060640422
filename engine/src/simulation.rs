use crate::config::ViewSettings;
use crate::render::draw::Canvas;

/// Whether the loop keeps running after a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The program side of the loop.
///
/// The loop calls `on_start` once before the first frame, `on_frame` once per rendered
/// frame and `on_command` for every character key the user types. All calls happen on
/// the loop's thread.
pub trait Simulation {
    fn on_start(&mut self, view: &mut ViewSettings);

    /// `paused` is true while the viewer is paused; the simulation must still draw.
    fn on_frame(&mut self, paused: bool, canvas: &mut dyn Canvas);

    fn on_command(&mut self, key: char) -> Flow;
}

/// Viewer-level controls handled by the loop rather than the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    TogglePause,
    /// Run exactly one unpaused frame while paused.
    SingleStep,
    Exit,
}

/// Pause bookkeeping shared by the windowed and headless loops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseState {
    paused: bool,
    single_step: bool,
}

impl PauseState {
    pub fn new(paused: bool) -> Self {
        Self {
            paused,
            single_step: false,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Apply a control; returns [`Flow::Exit`] for [`LoopControl::Exit`].
    pub fn apply(&mut self, control: LoopControl) -> Flow {
        match control {
            LoopControl::TogglePause => {
                self.paused = !self.paused;
                log::info!("simulation {}", if self.paused { "paused" } else { "resumed" });
            }
            LoopControl::SingleStep => self.single_step = true,
            LoopControl::Exit => return Flow::Exit,
        }
        Flow::Continue
    }

    /// The `paused` argument for the next frame. Consumes a pending single step.
    pub fn next_frame(&mut self) -> bool {
        let paused = self.paused && !self.single_step;
        self.single_step = false;
        paused
    }
}
