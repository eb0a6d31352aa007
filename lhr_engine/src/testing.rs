//! Shared fixture for command unit tests.

use std::sync::Arc;

use lhr_common::hardware::HardwareControl;
use lhr_hal::{SimulatedHardware, SimulationConfig, SimulationHandle};

use crate::commands::{CommandContext, CommandImplementation, Executed};
use crate::config::EngineConfig;
use crate::error::CommandError;
use crate::resources::{LabwareDefinition, PipetteName, SequentialModelUtils};
use crate::state::update::LoadedLabwareUpdate;
use crate::state::{State, StateStore, StateUpdate, StateView};
use crate::types::{ApiVersion, DeckSlot, LabwareLocation, Mount, RobotType};

pub(crate) struct Harness {
    pub hardware: SimulatedHardware,
    pub handle: SimulationHandle,
    pub store: StateStore,
    pub utils: SequentialModelUtils,
    pub config: EngineConfig,
}

impl Harness {
    pub fn new(robot_type: RobotType, api_version: ApiVersion) -> Self {
        let hardware = SimulatedHardware::new(SimulationConfig::default());
        let handle = hardware.handle();
        let config = EngineConfig::new(robot_type, api_version);
        Self {
            hardware,
            handle,
            store: StateStore::new(State::new(config.state_config())),
            utils: SequentialModelUtils::new("test"),
            config,
        }
    }

    pub fn ot2() -> Self {
        Self::new(RobotType::Ot2, ApiVersion::LATEST)
    }

    pub fn view(&self) -> StateView {
        self.store.view()
    }

    pub fn commit(&self, update: &StateUpdate) {
        self.store.commit(update);
    }

    pub async fn run<C: CommandImplementation>(
        &mut self,
        implementation: C,
        params: &C::Params,
    ) -> Result<Executed<C::Result>, CommandError> {
        let view = self.store.view();
        let mut ctx = CommandContext::new(&mut self.hardware, &view, &self.utils, &self.config);
        implementation.execute(params, &mut ctx).await
    }

    /// Run and commit the resulting update, whatever the outcome.
    pub async fn run_and_commit<C: CommandImplementation>(
        &mut self,
        implementation: C,
        params: &C::Params,
    ) -> Result<Executed<C::Result>, CommandError> {
        let executed = self.run(implementation, params).await?;
        self.commit(executed.state_update());
        Ok(executed)
    }

    fn load_labware(&self, id: &str, load_name: &str, slot: u8) {
        let mut update = StateUpdate::new();
        update.set_loaded_labware(LoadedLabwareUpdate {
            labware_id: id.to_string(),
            definition: Arc::new(LabwareDefinition::builtin(load_name).unwrap()),
            location: LabwareLocation::Slot {
                slot_name: DeckSlot::new(slot).unwrap(),
            },
            offset_id: None,
            display_name: None,
        });
        self.commit(&update);
    }

    /// Homed robot, `p1` on the left mount, `plate` in slot 1 and `tips` in
    /// slot 2.
    pub async fn with_pipette_and_plate(mut self) -> Self {
        let (name, tips) = match self.config.robot_type() {
            RobotType::Ot2 => (PipetteName::P300SingleGen2, "opentrons_96_tiprack_300ul"),
            RobotType::Flex => (PipetteName::P1000SingleFlex, "opentrons_flex_96_tiprack_1000ul"),
        };
        let definition = name.definition();
        self.hardware.home(None).await.unwrap();
        self.hardware
            .cache_instrument(Mount::Left, definition.model)
            .await
            .unwrap();

        let mut update = StateUpdate::new();
        update
            .set_loaded_pipette("p1", name, Mount::Left)
            .update_pipette_config("p1", definition.config_for_volume(None))
            .set_fluid_unknown("p1");
        self.commit(&update);
        self.load_labware("plate", "corning_96_wellplate_360ul_flat", 1);
        self.load_labware("tips", tips, 2);
        self
    }

    /// As [`Self::with_pipette_and_plate`], plus a clean tip from `tips` A1.
    pub async fn with_tip_and_plate(self) -> Self {
        let mut h = self.with_pipette_and_plate().await;
        let tip = h
            .view()
            .labware()
            .get_definition("tips")
            .unwrap()
            .tip_geometry()
            .unwrap();
        h.hardware
            .pick_up_tip(Mount::Left, tip.length)
            .await
            .unwrap();
        let mut update = StateUpdate::new();
        update
            .update_pipette_tip_state("p1", Some(tip))
            .set_fluid_empty("p1");
        h.commit(&update);
        let mut used = StateUpdate::new();
        used.mark_tips_used("p1", "tips", "A1");
        h.commit(&used);
        h
    }
}
