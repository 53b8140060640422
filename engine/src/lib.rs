//! Window, event loop and primitive renderer for small rigid-body simulations.
//!
//! A program implements [`Simulation`] and hands it to [`EngineContext::run`]; the loop
//! calls back into it to step, draw and react to keys. [`HeadlessRunner`] drives the same
//! callbacks without a window.

pub mod args;
pub mod config;
pub mod context;
pub mod error;
pub mod headless;
pub mod render;
pub mod simulation;

pub use args::LoopArgs;
pub use config::{ViewSettings, WindowConfig};
pub use context::{init_logging, EngineContext};
pub use error::EngineError;
pub use headless::{HeadlessReport, HeadlessRunner};
pub use render::draw::{Canvas, Color, DrawCommand, DrawList, Pose, Primitive};
pub use simulation::{Flow, LoopControl, PauseState, Simulation};
