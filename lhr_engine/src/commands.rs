//! Command models and implementations.
//!
//! A command is created from [`CommandCreate`] (wire shape
//! `{"commandType": ..., "params": {...}}`), executed by its
//! [`CommandImplementation`] and stored as a [`Command`] with a terminal
//! status.

pub mod aspirate;
pub mod aspirate_in_place;
pub mod blow_out;
pub mod blow_out_in_place;
pub mod configure_for_volume;
pub mod configure_nozzle_layout;
pub mod dispense;
pub mod dispense_in_place;
pub mod drop_tip;
pub mod drop_tip_in_place;
pub mod home;
pub mod load_labware;
pub mod load_module;
pub mod load_pipette;
pub mod move_to_addressable_area;
pub mod move_to_coordinates;
pub mod pick_up_tip;
pub mod prepare_to_aspirate;
pub mod reload_labware;
pub mod reset_tips;
pub mod update_position_estimators;

mod pipetting_common;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CommandError, DefinedError, ErrorOccurrence};
use crate::state::StateUpdate;

pub use crate::execution::CommandContext;

/// Outcome of a command that did not raise.
#[derive(Debug, Clone)]
pub struct SuccessData<R> {
    pub public: R,
    pub state_update: StateUpdate,
}

/// A recoverable failure. The state update is still committed.
#[derive(Debug, Clone)]
pub struct DefinedErrorData {
    pub public: DefinedError,
    pub state_update: StateUpdate,
}

#[derive(Debug, Clone)]
pub enum Executed<R> {
    Success(SuccessData<R>),
    DefinedError(DefinedErrorData),
}

impl<R> Executed<R> {
    pub fn success(public: R, state_update: StateUpdate) -> Self {
        Self::Success(SuccessData {
            public,
            state_update,
        })
    }

    pub fn defined_error(public: DefinedError, state_update: StateUpdate) -> Self {
        Self::DefinedError(DefinedErrorData {
            public,
            state_update,
        })
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> Executed<U> {
        match self {
            Self::Success(data) => Executed::Success(SuccessData {
                public: f(data.public),
                state_update: data.state_update,
            }),
            Self::DefinedError(data) => Executed::DefinedError(data),
        }
    }

    pub fn state_update(&self) -> &StateUpdate {
        match self {
            Self::Success(data) => &data.state_update,
            Self::DefinedError(data) => &data.state_update,
        }
    }
}

/// Behaviour of one command type.
///
/// `Err` is for preconditions and unexpected failures. Defined errors are
/// returned as `Ok(Executed::DefinedError(..))`.
#[async_trait]
pub trait CommandImplementation: Send + Sync {
    type Params: Send + Sync;
    type Result: Send;

    async fn execute(
        &self,
        params: &Self::Params,
        ctx: &mut CommandContext<'_>,
    ) -> Result<Executed<Self::Result>, CommandError>;
}

macro_rules! command_types {
    ($( $variant:ident => $wire:literal, $module:ident :: $params:ident, $result:ident, $imp:ident; )*) => {
        /// Wire name of every command the engine understands.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum CommandType {
            $( #[serde(rename = $wire)] $variant, )*
        }

        impl CommandType {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )*
                }
            }
        }

        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "commandType", content = "params")]
        pub enum CommandParams {
            $( #[serde(rename = $wire)] $variant($module::$params), )*
        }

        impl CommandParams {
            pub const fn command_type(&self) -> CommandType {
                match self {
                    $( Self::$variant(_) => CommandType::$variant, )*
                }
            }
        }

        /// Public result of a succeeded command.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum CommandResult {
            $( $variant($module::$result), )*
        }

        $(
            impl From<$module::$result> for CommandResult {
                fn from(result: $module::$result) -> Self {
                    Self::$variant(result)
                }
            }
        )*

        /// Run `params` through its implementation.
        pub async fn dispatch(
            params: &CommandParams,
            ctx: &mut CommandContext<'_>,
        ) -> Result<Executed<CommandResult>, CommandError> {
            match params {
                $(
                    CommandParams::$variant(p) => Ok($module::$imp
                        .execute(p, ctx)
                        .await?
                        .map(CommandResult::from)),
                )*
            }
        }
    };
}

command_types! {
    Aspirate => "aspirate",
        aspirate::AspirateParams, AspirateResult, AspirateImplementation;
    AspirateInPlace => "aspirateInPlace",
        aspirate_in_place::AspirateInPlaceParams, AspirateInPlaceResult, AspirateInPlaceImplementation;
    Dispense => "dispense",
        dispense::DispenseParams, DispenseResult, DispenseImplementation;
    DispenseInPlace => "dispenseInPlace",
        dispense_in_place::DispenseInPlaceParams, DispenseInPlaceResult, DispenseInPlaceImplementation;
    BlowOut => "blowout",
        blow_out::BlowOutParams, BlowOutResult, BlowOutImplementation;
    BlowOutInPlace => "blowOutInPlace",
        blow_out_in_place::BlowOutInPlaceParams, BlowOutInPlaceResult, BlowOutInPlaceImplementation;
    Home => "home",
        home::HomeParams, HomeResult, HomeImplementation;
    MoveToCoordinates => "moveToCoordinates",
        move_to_coordinates::MoveToCoordinatesParams, MoveToCoordinatesResult, MoveToCoordinatesImplementation;
    MoveToAddressableArea => "moveToAddressableArea",
        move_to_addressable_area::MoveToAddressableAreaParams, MoveToAddressableAreaResult, MoveToAddressableAreaImplementation;
    ConfigureForVolume => "configureForVolume",
        configure_for_volume::ConfigureForVolumeParams, ConfigureForVolumeResult, ConfigureForVolumeImplementation;
    ConfigureNozzleLayout => "configureNozzleLayout",
        configure_nozzle_layout::ConfigureNozzleLayoutParams, ConfigureNozzleLayoutResult, ConfigureNozzleLayoutImplementation;
    PrepareToAspirate => "prepareToAspirate",
        prepare_to_aspirate::PrepareToAspirateParams, PrepareToAspirateResult, PrepareToAspirateImplementation;
    LoadPipette => "loadPipette",
        load_pipette::LoadPipetteParams, LoadPipetteResult, LoadPipetteImplementation;
    LoadLabware => "loadLabware",
        load_labware::LoadLabwareParams, LoadLabwareResult, LoadLabwareImplementation;
    ReloadLabware => "reloadLabware",
        reload_labware::ReloadLabwareParams, ReloadLabwareResult, ReloadLabwareImplementation;
    LoadModule => "loadModule",
        load_module::LoadModuleParams, LoadModuleResult, LoadModuleImplementation;
    PickUpTip => "pickUpTip",
        pick_up_tip::PickUpTipParams, PickUpTipResult, PickUpTipImplementation;
    DropTip => "dropTip",
        drop_tip::DropTipParams, DropTipResult, DropTipImplementation;
    DropTipInPlace => "dropTipInPlace",
        drop_tip_in_place::DropTipInPlaceParams, DropTipInPlaceResult, DropTipInPlaceImplementation;
    ResetTips => "resetTips",
        reset_tips::ResetTipsParams, ResetTipsResult, ResetTipsImplementation;
    UpdatePositionEstimators => "unsafe/updatePositionEstimators",
        update_position_estimators::UpdatePositionEstimatorsParams, UpdatePositionEstimatorsResult, UpdatePositionEstimatorsImplementation;
}

impl std::fmt::Display for CommandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to run a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandCreate {
    #[serde(flatten)]
    pub params: CommandParams,
    /// Client-supplied idempotency key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl CommandCreate {
    pub fn new(params: CommandParams) -> Self {
        Self { params, key: None }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl From<CommandParams> for CommandCreate {
    fn from(params: CommandParams) -> Self {
        Self::new(params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    /// Failed in a way that halted the engine.
    Fatal,
}

impl CommandStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Fatal)
    }
}

/// A command and, once it has run, its outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: String,
    pub key: String,
    #[serde(flatten)]
    pub params: CommandParams,
    pub status: CommandStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<CommandResult>,
    pub error: Option<ErrorOccurrence>,
}

impl Command {
    #[inline]
    pub fn command_type(&self) -> CommandType {
        self.params.command_type()
    }
}
