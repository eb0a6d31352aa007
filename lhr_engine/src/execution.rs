//! Handlers shared by command implementations.
//!
//! Commands describe *what* happens; handlers here do the hardware work and
//! the geometry lookups behind it. Handlers never produce state updates.

pub mod equipment;
pub mod movement;
pub mod pipetting;
pub mod tip_handler;

use lhr_common::hardware::HardwareControl;

use crate::config::EngineConfig;
use crate::error::StateError;
use crate::resources::ModelUtils;
use crate::state::StateView;
use crate::types::Mount;

/// Everything a command may use while it runs.
///
/// `state` is the snapshot as of the last commit. Effects of the running
/// command are not visible in it.
pub struct CommandContext<'a> {
    pub hardware: &'a mut dyn HardwareControl,
    pub state: &'a StateView,
    pub model_utils: &'a dyn ModelUtils,
    pub config: &'a EngineConfig,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        hardware: &'a mut dyn HardwareControl,
        state: &'a StateView,
        model_utils: &'a dyn ModelUtils,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            hardware,
            state,
            model_utils,
            config,
        }
    }

    #[inline]
    pub fn mount(&self, pipette_id: &str) -> Result<Mount, StateError> {
        self.state.pipettes().get_mount(pipette_id)
    }
}
