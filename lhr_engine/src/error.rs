//! Error taxonomy of the engine.
//!
//! - [`StateError`]: a lookup into the state store failed.
//! - [`CommandError`]: a command could not run. Precondition variants leave
//!   the engine usable. `Hardware` and `Internal` are fatal.
//! - [`DefinedError`]: recoverable, per-command failures that still carry a
//!   state update. Returned as values, never through `Err`.
//! - [`EngineError`]: the engine itself refused or halted.

pub mod defined;
pub mod occurrence;

pub use defined::{DefinedError, OverpressureError, TipPhysicallyMissingError};
pub use occurrence::ErrorOccurrence;

use lhr_common::config::ConfigError;
use lhr_common::hardware::HardwareError;
use thiserror::Error;

use crate::deck_conflict::DeckConflictError;
use crate::types::RobotType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    #[error("Pipette {0} has not been loaded")]
    PipetteNotLoaded(String),

    #[error("Labware {0} has not been loaded")]
    LabwareNotLoaded(String),

    #[error("No labware definition found for {0}")]
    LabwareDefinitionNotFound(String),

    #[error("Module {0} has not been loaded")]
    ModuleNotLoaded(String),

    #[error("Well {well_name} does not exist in labware {labware_id}")]
    WellDoesNotExist {
        labware_id: String,
        well_name: String,
    },

    #[error("Labware {0} is not on the deck")]
    LabwareNotOnDeck(String),

    #[error("Unknown addressable area {0}")]
    AddressableAreaDoesNotExist(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    DeckConflict(#[from] DeckConflictError),

    #[error("Pipette {0} has no tip attached")]
    TipNotAttached(String),

    #[error("Pipette {0} already has a tip attached")]
    TipAlreadyAttached(String),

    #[error("Pipette {0} is not ready to aspirate; its contents are unknown")]
    PipetteNotReadyToAspirate(String),

    #[error("Cannot aspirate {requested} µL; only {available} µL available")]
    InvalidAspirateVolume { requested: f64, available: f64 },

    #[error("Cannot dispense {requested} µL; pipette holds {held} µL")]
    InvalidDispenseVolume { requested: f64, held: f64 },

    #[error("Volume of pipette {0} is unknown; a zero-volume request cannot be resolved")]
    UnknownPipetteVolume(String),

    #[error("{name} is not supported on robot type {robot_type}")]
    InvalidSpecificationForRobotType { name: String, robot_type: RobotType },

    #[error("Labware {0} is not a tip rack")]
    LabwareIsNotTipRack(String),

    #[error("Not supported on this robot: {0}")]
    HardwareNotSupported(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Run was stopped before this command started")]
    RunStopped,

    #[error("Hardware command failed")]
    Hardware(#[from] HardwareError),

    #[error("Internal engine error: {0}")]
    Internal(String),
}

impl CommandError {
    /// Caller misuse, detected before any state change.
    pub const fn is_precondition(&self) -> bool {
        !matches!(self, Self::Hardware(_) | Self::Internal(_))
    }

    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::State(_) => "StateLookupError",
            Self::DeckConflict(_) => "DeckConflictError",
            Self::TipNotAttached(_) => "TipNotAttachedError",
            Self::TipAlreadyAttached(_) => "TipAttachedError",
            Self::PipetteNotReadyToAspirate(_) => "PipetteNotReadyToAspirateError",
            Self::InvalidAspirateVolume { .. } => "InvalidAspirateVolumeError",
            Self::InvalidDispenseVolume { .. } => "InvalidDispenseVolumeError",
            Self::UnknownPipetteVolume(_) => "UnknownPipetteVolumeError",
            Self::InvalidSpecificationForRobotType { .. } => {
                "InvalidSpecificationForRobotTypeError"
            }
            Self::LabwareIsNotTipRack(_) => "LabwareIsNotTipRackError",
            Self::HardwareNotSupported(_) => "HardwareNotSupportedError",
            Self::InvalidParams(_) => "InvalidParamsError",
            Self::RunStopped => "RunStoppedError",
            Self::Hardware(_) => "HardwareError",
            Self::Internal(_) => "UnexpectedError",
        }
    }

    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Hardware(hw) => hw.error_code(),
            Self::DeckConflict(_) => "2004",
            Self::TipNotAttached(_) | Self::TipAlreadyAttached(_) => "3000",
            Self::PipetteNotReadyToAspirate(_) => "3005",
            Self::RunStopped => "4004",
            _ => "4000",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine halted after a fatal error; no further commands accepted")]
    Halted,

    #[error("Engine has been stopped")]
    Stopped,

    #[error("Command {command_id} failed fatally")]
    CommandFatal {
        command_id: String,
        #[source]
        source: CommandError,
    },

    #[error("Command {0} not found")]
    CommandNotFound(String),

    #[error("{0}")]
    InvalidParams(String),

    #[error("Invalid engine transition: {0}")]
    InvalidTransition(&'static str),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
