//! A windowless frame loop, for tests and batch runs.

use std::collections::BTreeMap;

use crate::config::ViewSettings;
use crate::render::draw::DrawList;
use crate::simulation::{Flow, LoopControl, PauseState, Simulation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Key(char),
    Control(LoopControl),
}

/// Drives a [`Simulation`] for a fixed number of frames, feeding scripted input.
///
/// Input scheduled for frame `n` is delivered before frame `n` is drawn, in the order it
/// was added.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRunner {
    frames: u64,
    start_paused: bool,
    script: BTreeMap<u64, Vec<Input>>,
}

#[derive(Debug, Clone)]
pub struct HeadlessReport {
    /// Number of `on_frame` calls made.
    pub frames_drawn: u64,
    /// Frames that were called with `paused == false`.
    pub frames_stepped: u64,
    /// True if a command or control ended the run before `frames` were drawn.
    pub exited: bool,
    pub view: ViewSettings,
    /// What the final frame drew.
    pub last_frame: DrawList,
}

impl HeadlessRunner {
    pub fn new(frames: u64) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }

    pub fn start_paused(mut self, paused: bool) -> Self {
        self.start_paused = paused;
        self
    }

    pub fn key_at(mut self, frame: u64, key: char) -> Self {
        self.script.entry(frame).or_default().push(Input::Key(key));
        self
    }

    pub fn control_at(mut self, frame: u64, control: LoopControl) -> Self {
        self.script
            .entry(frame)
            .or_default()
            .push(Input::Control(control));
        self
    }

    pub fn run(&self, sim: &mut dyn Simulation) -> HeadlessReport {
        let mut view = ViewSettings::default();
        sim.on_start(&mut view);

        let mut pause = PauseState::new(self.start_paused);
        let mut report = HeadlessReport {
            frames_drawn: 0,
            frames_stepped: 0,
            exited: false,
            view,
            last_frame: DrawList::new(),
        };

        for frame in 0..self.frames {
            for input in self.script.get(&frame).into_iter().flatten() {
                let flow = match *input {
                    Input::Key(key) => sim.on_command(key),
                    Input::Control(control) => pause.apply(control),
                };
                if flow == Flow::Exit {
                    log::debug!("headless run exited before frame {frame}");
                    report.exited = true;
                    return report;
                }
            }

            let paused = pause.next_frame();
            report.last_frame.clear();
            sim.on_frame(paused, &mut report.last_frame);
            report.frames_drawn += 1;
            if !paused {
                report.frames_stepped += 1;
            }
        }
        report
    }
}
