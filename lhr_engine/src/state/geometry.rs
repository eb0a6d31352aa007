//! Deck geometry derived from the labware, module and area slices.

use super::State;
use super::areas::{FIXED_TRASH_AREA, trash_bin_slot};
use super::labware::LabwareView;
use super::modules::ModuleView;
use crate::error::StateError;
use crate::resources::{LabwareDefinition, WellDefinition};
use crate::types::{
    DeckPoint, DeckSlot, LabwareLocation, NozzleMap, RobotType, WellLocation, WellOrigin,
};

/// Footprint of a deck slot (mm).
pub const SLOT_FOOTPRINT: (f64, f64) = (127.76, 85.48);

/// Height of a Flex movable trash bin (mm).
pub const TRASH_BIN_HEIGHT: f64 = 40.0;

/// Height of the OT-2 fixed trash (mm).
pub const FIXED_TRASH_HEIGHT: f64 = 82.0;

const OT2_SLOT_PITCH: (f64, f64) = (132.5, 90.5);
const FLEX_SLOT_PITCH: (f64, f64) = (164.0, 107.0);

/// Front-left-bottom corner of a deck slot.
pub fn slot_origin(slot: DeckSlot, robot_type: RobotType) -> DeckPoint {
    let (pitch_x, pitch_y) = match robot_type {
        RobotType::Ot2 => OT2_SLOT_PITCH,
        RobotType::Flex => FLEX_SLOT_PITCH,
    };
    DeckPoint::new(
        f64::from(slot.column()) * pitch_x,
        f64::from(slot.row()) * pitch_y,
        0.0,
    )
}

/// Center of a slot's footprint at the given height.
pub fn slot_center(slot: DeckSlot, robot_type: RobotType, z: f64) -> DeckPoint {
    let origin = slot_origin(slot, robot_type);
    DeckPoint::new(
        origin.x + SLOT_FOOTPRINT.0 / 2.0,
        origin.y + SLOT_FOOTPRINT.1 / 2.0,
        z,
    )
}

#[derive(Debug, Clone, Copy)]
pub struct GeometryView<'a> {
    state: &'a State,
}

impl<'a> GeometryView<'a> {
    pub fn new(state: &'a State) -> Self {
        Self { state }
    }

    fn labware(&self) -> LabwareView<'a> {
        LabwareView::new(&self.state.labware)
    }

    fn modules(&self) -> ModuleView<'a> {
        ModuleView::new(&self.state.modules)
    }

    /// Origin of a labware, including its calibration offset.
    pub fn get_labware_origin(&self, labware_id: &str) -> Result<DeckPoint, StateError> {
        let robot_type = self.state.config.robot_type;
        let base = match self.labware().get_location(labware_id)? {
            LabwareLocation::Slot { slot_name } => slot_origin(*slot_name, robot_type),
            LabwareLocation::Module { module_id } => {
                let module = self.modules().get(module_id)?;
                slot_origin(module.slot, robot_type)
                    + DeckPoint::new(0.0, 0.0, module.model.labware_offset_z())
            }
            LabwareLocation::OnLabware { labware_id: parent } => {
                let parent_height = self.labware().get_definition(parent)?.dimensions.z_dimension;
                self.get_labware_origin(parent)? + DeckPoint::new(0.0, 0.0, parent_height)
            }
            LabwareLocation::OffDeck => {
                return Err(StateError::LabwareNotOnDeck(labware_id.to_string()));
            }
        };
        Ok(base + self.labware().get_offset_vector(labware_id)?)
    }

    pub fn get_labware_highest_z(&self, labware_id: &str) -> Result<f64, StateError> {
        let height = self.labware().get_definition(labware_id)?.dimensions.z_dimension;
        Ok(self.get_labware_origin(labware_id)?.z + height)
    }

    /// Top of a module, or of the labware seated on it.
    pub fn get_module_highest_z(&self, module_id: &str) -> Result<f64, StateError> {
        match self.labware().get_id_by_module(module_id) {
            Some(labware_id) => {
                let mut top = labware_id.to_string();
                while let Some(stacked) = self.labware().get_id_by_labware(&top) {
                    top = stacked.to_string();
                }
                self.get_labware_highest_z(&top)
            }
            None => self.modules().get_overall_height(module_id),
        }
    }

    fn well(
        &self,
        labware_id: &str,
        well_name: &str,
    ) -> Result<(&'a LabwareDefinition, &'a WellDefinition), StateError> {
        let definition = self.labware().get_definition(labware_id)?;
        let well = definition
            .well(well_name)
            .ok_or_else(|| StateError::WellDoesNotExist {
                labware_id: labware_id.to_string(),
                well_name: well_name.to_string(),
            })?;
        Ok((definition, well))
    }

    /// Absolute position of a point inside a well.
    pub fn get_well_position(
        &self,
        labware_id: &str,
        well_name: &str,
        location: &WellLocation,
    ) -> Result<DeckPoint, StateError> {
        let (_, well) = self.well(labware_id, well_name)?;
        let origin = self.get_labware_origin(labware_id)?;
        let z = match location.origin {
            WellOrigin::Top => well.z + well.depth,
            WellOrigin::Bottom => well.z,
            WellOrigin::Center => well.z + well.depth / 2.0,
        };
        Ok(origin
            + DeckPoint::new(
                well.x + location.offset.x,
                well.y + location.offset.y,
                z + location.offset.z,
            ))
    }

    pub fn get_well_top(&self, labware_id: &str, well_name: &str) -> Result<DeckPoint, StateError> {
        self.get_well_position(labware_id, well_name, &WellLocation::top())
    }

    pub fn ensure_well_exists(&self, labware_id: &str, well_name: &str) -> Result<(), StateError> {
        self.well(labware_id, well_name).map(|_| ())
    }

    /// Wells under a nozzle rectangle whose back-left nozzle sits over
    /// `well_name`, clipped to the labware.
    pub fn get_covered_wells(
        &self,
        labware_id: &str,
        well_name: &str,
        nozzle_map: NozzleMap,
    ) -> Result<Vec<String>, StateError> {
        let (definition, _) = self.well(labware_id, well_name)?;
        let (row, column) = definition.well_grid_position(well_name).ok_or_else(|| {
            StateError::WellDoesNotExist {
                labware_id: labware_id.to_string(),
                well_name: well_name.to_string(),
            }
        })?;
        let mut covered = Vec::new();
        for c in column..column + nozzle_map.columns as usize {
            for r in row..row + nozzle_map.rows as usize {
                if let Some(name) = definition.well_at(r, c) {
                    covered.push(name.to_string());
                }
            }
        }
        Ok(covered)
    }

    /// Number of nozzles entering each well of a labware.
    pub fn get_nozzles_per_well(
        &self,
        labware_id: &str,
        nozzle_map: NozzleMap,
    ) -> Result<u32, StateError> {
        let (rows, _) = self.labware().get_definition(labware_id)?.grid_size();
        let rows = u32::try_from(rows.max(1)).unwrap_or(u32::MAX);
        Ok((u32::from(nozzle_map.rows) / rows).max(1))
    }

    /// Reference point of an addressable area: slot areas, the fixed trash,
    /// or a movable trash bin.
    pub fn get_addressable_area_position(&self, area_name: &str) -> Result<DeckPoint, StateError> {
        let robot_type = self.state.config.robot_type;
        if area_name == FIXED_TRASH_AREA && robot_type == RobotType::Ot2 {
            return Ok(slot_center(DeckSlot::FIXED_TRASH, robot_type, FIXED_TRASH_HEIGHT));
        }
        if let Some(slot) = trash_bin_slot(area_name).filter(|_| robot_type == RobotType::Flex) {
            return Ok(slot_center(slot, robot_type, TRASH_BIN_HEIGHT));
        }
        area_name
            .parse::<DeckSlot>()
            .map(|slot| slot_center(slot, robot_type, 0.0))
            .map_err(|_| StateError::AddressableAreaDoesNotExist(area_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::update::{LoadModuleUpdate, LoadedLabwareUpdate, StateUpdate};
    use crate::state::{State, StateConfig};
    use crate::types::{ApiVersion, ModuleModel, WellOffset};
    use std::sync::Arc;

    fn state_with(robot_type: RobotType) -> State {
        State::new(StateConfig {
            robot_type,
            api_version: ApiVersion::LATEST,
        })
    }

    fn load(state: State, id: &str, load_name: &str, location: LabwareLocation) -> State {
        let mut update = StateUpdate::new();
        update.set_loaded_labware(LoadedLabwareUpdate {
            labware_id: id.to_string(),
            definition: Arc::new(LabwareDefinition::builtin(load_name).unwrap()),
            location,
            offset_id: None,
            display_name: None,
        });
        state.apply(&update)
    }

    fn slot(n: u8) -> LabwareLocation {
        LabwareLocation::Slot {
            slot_name: DeckSlot::new(n).unwrap(),
        }
    }

    #[test]
    fn slot_origins() {
        let five = DeckSlot::new(5).unwrap();
        assert_eq!(slot_origin(five, RobotType::Ot2), DeckPoint::new(132.5, 90.5, 0.0));
        assert_eq!(slot_origin(five, RobotType::Flex), DeckPoint::new(164.0, 107.0, 0.0));
    }

    #[test]
    fn well_positions_by_origin() {
        let state = load(
            state_with(RobotType::Ot2),
            "plate",
            "corning_96_wellplate_360ul_flat",
            slot(2),
        );
        let geometry = GeometryView::new(&state);

        let bottom = geometry
            .get_well_position("plate", "A1", &WellLocation::liquid_handling_default())
            .unwrap();
        assert!((bottom.x - (132.5 + 14.38)).abs() < 1e-9);
        assert!((bottom.z - (3.55 + 1.0)).abs() < 1e-9);

        let top = geometry.get_well_top("plate", "A1").unwrap();
        assert!((top.z - (3.55 + 10.67)).abs() < 1e-9);

        let shifted = geometry
            .get_well_position(
                "plate",
                "A1",
                &WellLocation {
                    origin: WellOrigin::Center,
                    offset: WellOffset {
                        x: 1.0,
                        y: 0.0,
                        z: 0.0,
                    },
                },
            )
            .unwrap();
        assert!((shifted.x - bottom.x - 1.0).abs() < 1e-9);

        assert!(matches!(
            geometry.get_well_top("plate", "Z99"),
            Err(StateError::WellDoesNotExist { .. })
        ));
    }

    #[test]
    fn labware_on_module_rises() {
        let mut update = StateUpdate::new();
        update.set_loaded_module(LoadModuleUpdate {
            module_id: "temp".to_string(),
            model: ModuleModel::TemperatureModuleV2,
            slot: DeckSlot::new(3).unwrap(),
            semi_configuration: false,
        });
        let state = state_with(RobotType::Ot2).apply(&update);
        assert_eq!(GeometryView::new(&state).get_module_highest_z("temp").unwrap(), 84.0);

        let state = load(
            state,
            "plate",
            "corning_96_wellplate_360ul_flat",
            LabwareLocation::Module {
                module_id: "temp".to_string(),
            },
        );
        let geometry = GeometryView::new(&state);
        assert!((geometry.get_labware_highest_z("plate").unwrap() - (9.0 + 14.22)).abs() < 1e-9);
        assert!((geometry.get_module_highest_z("temp").unwrap() - (9.0 + 14.22)).abs() < 1e-9);
    }

    #[test]
    fn off_deck_has_no_position() {
        let state = load(
            state_with(RobotType::Ot2),
            "plate",
            "corning_96_wellplate_360ul_flat",
            LabwareLocation::OffDeck,
        );
        assert!(matches!(
            GeometryView::new(&state).get_labware_origin("plate"),
            Err(StateError::LabwareNotOnDeck(_))
        ));
    }

    #[test]
    fn covered_wells_and_nozzles_per_well() {
        let state = load(
            state_with(RobotType::Ot2),
            "plate",
            "corning_96_wellplate_360ul_flat",
            slot(1),
        );
        let state = load(state, "res", "nest_12_reservoir_15ml", slot(2));
        let geometry = GeometryView::new(&state);

        let column = geometry
            .get_covered_wells("plate", "A1", NozzleMap::COLUMN)
            .unwrap();
        assert_eq!(column.len(), 8);
        assert_eq!(column.last().map(String::as_str), Some("H1"));
        assert_eq!(
            geometry
                .get_covered_wells("plate", "E12", NozzleMap::COLUMN)
                .unwrap(),
            vec!["E12", "F12", "G12", "H12"]
        );
        assert_eq!(geometry.get_nozzles_per_well("plate", NozzleMap::COLUMN).unwrap(), 1);

        assert_eq!(
            geometry.get_covered_wells("res", "A3", NozzleMap::COLUMN).unwrap(),
            vec!["A3"]
        );
        assert_eq!(geometry.get_nozzles_per_well("res", NozzleMap::COLUMN).unwrap(), 8);
        assert_eq!(geometry.get_nozzles_per_well("res", NozzleMap::SINGLE).unwrap(), 1);
    }

    #[test]
    fn addressable_areas() {
        let ot2 = state_with(RobotType::Ot2);
        let geometry = GeometryView::new(&ot2);
        assert_eq!(geometry.get_addressable_area_position("fixedTrash").unwrap().z, 82.0);
        assert!(geometry.get_addressable_area_position("movableTrashA3").is_err());
        assert!(geometry.get_addressable_area_position("4").is_ok());

        let flex = state_with(RobotType::Flex);
        let geometry = GeometryView::new(&flex);
        assert_eq!(
            geometry.get_addressable_area_position("movableTrashA3").unwrap().z,
            TRASH_BIN_HEIGHT
        );
        assert!(matches!(
            geometry.get_addressable_area_position("fixedTrash"),
            Err(StateError::AddressableAreaDoesNotExist(_))
        ));
    }
}
