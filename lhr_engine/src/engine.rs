//! Command execution engine.
//!
//! - [`machine`] - Engine lifecycle: `Idle`, `Running`, `Stopped`, `Halted`
//! - [`executor`] - Queue, dispatch, outcome classification and commit

pub mod executor;
pub mod machine;

pub use executor::{CommandEngine, CommandOutcome, StopHandle};
pub use machine::{EngineEvent, EngineState, EngineStateMachine, TransitionResult};
