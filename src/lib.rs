// Library surface for the drill binary, headless tests and reuse.
// Terminal rendering stays in the binary.
pub mod app_dirs;
pub mod config;
pub mod countdown;
pub mod engine;
pub mod error;
pub mod logging;
pub mod math;
pub mod milestones;
pub mod occurrences;
pub mod program;
pub mod runtime;
pub mod session;
pub mod stimulus;
pub mod strategy;
pub mod summary;
pub mod timing;

pub use engine::{EngineEvent, Frame, RunState, StimulusEngine};
pub use error::{Error, Result};
pub use stimulus::Stimulus;
