//! # LHR Engine Library
//!
//! Command execution engine for a laboratory liquid-handling robot. Commands
//! run one at a time against a [`lhr_common::hardware::HardwareControl`]
//! backend; each produces a [`state::StateUpdate`] that the engine commits to
//! a single-writer state store.
//!
//! ## Outcomes
//!
//! 1. **Succeeded**: result stored, update committed
//! 2. **Defined error**: command failed, update still committed
//! 3. **Precondition**: command failed, nothing committed, engine usable
//! 4. **Fatal**: nothing committed, engine halted
//!
//! ```rust,no_run
//! use lhr_engine::prelude::*;
//! use lhr_hal::SimulatedHardware;
//!
//! # async fn run() -> Result<(), EngineError> {
//! let mut engine = CommandEngine::new(
//!     Box::new(SimulatedHardware::default()),
//!     EngineConfig::default(),
//! );
//! let command = engine
//!     .execute(CommandCreate::new(CommandParams::Home(Default::default())))
//!     .await?;
//! assert_eq!(command.status, CommandStatus::Succeeded);
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod config;
pub mod deck_conflict;
pub mod engine;
pub mod error;
pub mod execution;
pub mod resources;
pub mod state;
pub mod types;

#[cfg(test)]
mod testing;

pub mod prelude {
    //! Common re-exports.

    pub use crate::commands::{Command, CommandCreate, CommandParams, CommandResult, CommandStatus};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{CommandEngine, EngineState, StopHandle};
    pub use crate::error::{CommandError, DefinedError, EngineError, ErrorOccurrence};
    pub use crate::state::{StateReader, StateUpdate, StateView};
    pub use crate::types::{ApiVersion, RobotType};
}
