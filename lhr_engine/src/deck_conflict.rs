//! Deck conflict checking.
//!
//! Every item on the deck generates restrictions on slots (its own and, for
//! some modules, its neighbours). A candidate placement is rejected when it
//! breaks a restriction of an existing item, or when one of its own
//! restrictions is broken by an item already on the deck.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::resources::LabwareDefinition;
use crate::state::StateView;
use crate::state::areas::trash_bin_slot;
use crate::state::geometry::TRASH_BIN_HEIGHT;
use crate::types::{DeckSlot, LabwareLocation, ModuleKind, ModuleModel, RobotType};

/// Tallest item allowed east or west of an OT-2 heater-shaker (mm).
pub const HS_MAX_NEIGHBOUR_HEIGHT: f64 = 53.0;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct DeckConflictError(pub String);

/// Something occupying a deck slot.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckItem {
    Labware {
        name: String,
        highest_z: f64,
        uri: String,
        is_fixed_trash: bool,
    },
    HeaterShaker {
        name: String,
        highest_z: f64,
    },
    MagneticBlock {
        name: String,
        highest_z: f64,
    },
    Thermocycler {
        name: String,
        highest_z: f64,
        is_semi: bool,
    },
    OtherModule {
        name: String,
        highest_z: f64,
    },
    TrashBin {
        name: String,
        highest_z: f64,
    },
}

impl DeckItem {
    /// Map a module model onto its deck item.
    pub fn module(model: ModuleModel, highest_z: f64, is_semi: bool) -> Self {
        let name = model.as_str().to_string();
        match model.kind() {
            ModuleKind::HeaterShaker => Self::HeaterShaker { name, highest_z },
            ModuleKind::MagneticBlock => Self::MagneticBlock { name, highest_z },
            ModuleKind::Thermocycler => Self::Thermocycler {
                name,
                highest_z,
                is_semi,
            },
            ModuleKind::Temperature | ModuleKind::Magnetic => Self::OtherModule { name, highest_z },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Labware { name, .. }
            | Self::HeaterShaker { name, .. }
            | Self::MagneticBlock { name, .. }
            | Self::Thermocycler { name, .. }
            | Self::OtherModule { name, .. }
            | Self::TrashBin { name, .. } => name,
        }
    }

    pub fn highest_z(&self) -> f64 {
        match self {
            Self::Labware { highest_z, .. }
            | Self::HeaterShaker { highest_z, .. }
            | Self::MagneticBlock { highest_z, .. }
            | Self::Thermocycler { highest_z, .. }
            | Self::OtherModule { highest_z, .. }
            | Self::TrashBin { highest_z, .. } => *highest_z,
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(
            self,
            Self::HeaterShaker { .. }
                | Self::MagneticBlock { .. }
                | Self::Thermocycler { .. }
                | Self::OtherModule { .. }
        )
    }

    fn is_fixed_trash(&self) -> bool {
        matches!(
            self,
            Self::Labware {
                is_fixed_trash: true,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    NothingAllowed,
    MaxHeight(f64),
    NoModule,
}

#[derive(Debug, Clone, Copy)]
struct Restriction {
    slot: DeckSlot,
    rule: Rule,
}

impl Restriction {
    fn is_allowed(&self, item: &DeckItem) -> bool {
        match self.rule {
            // The fixed trash can be replaced, and replaces anything.
            Rule::NothingAllowed => item.is_fixed_trash(),
            Rule::MaxHeight(max) => item.highest_z() < max,
            Rule::NoModule => !item.is_module(),
        }
    }
}

fn restrictions(item: &DeckItem, slot: DeckSlot, robot_type: RobotType) -> Vec<Restriction> {
    let nothing = |slot| Restriction {
        slot,
        rule: Rule::NothingAllowed,
    };

    if item.is_fixed_trash() {
        return Vec::new();
    }
    let mut out = vec![nothing(slot)];

    match item {
        DeckItem::Thermocycler { is_semi, .. } => {
            let covered = match (robot_type, is_semi) {
                (RobotType::Flex, _) | (RobotType::Ot2, true) => vec![slot.north()],
                (RobotType::Ot2, false) => vec![
                    slot.north(),
                    slot.east(),
                    slot.north().and_then(DeckSlot::east),
                ],
            };
            out.extend(covered.into_iter().flatten().map(nothing));
        }
        DeckItem::HeaterShaker { .. } if robot_type == RobotType::Ot2 => {
            for side in [slot.east(), slot.west()].into_iter().flatten() {
                out.push(Restriction {
                    slot: side,
                    rule: Rule::MaxHeight(HS_MAX_NEIGHBOUR_HEIGHT),
                });
            }
            for neighbour in [slot.north(), slot.south(), slot.east(), slot.west()]
                .into_iter()
                .flatten()
            {
                out.push(Restriction {
                    slot: neighbour,
                    rule: Rule::NoModule,
                });
            }
        }
        _ => {}
    }
    out
}

fn conflict(
    source: &DeckItem,
    source_slot: DeckSlot,
    item: &DeckItem,
    slot: DeckSlot,
    robot_type: RobotType,
) -> DeckConflictError {
    DeckConflictError(format!(
        "{} in slot {} prevents {} from using slot {}.",
        source.name(),
        source_slot.display_for(robot_type),
        item.name(),
        slot.display_for(robot_type),
    ))
}

/// Check a candidate item against the items already on the deck.
pub fn check(
    existing: &BTreeMap<DeckSlot, DeckItem>,
    new_item: &DeckItem,
    new_slot: DeckSlot,
    robot_type: RobotType,
) -> Result<(), DeckConflictError> {
    // Items already on the deck claim their restrictions first.
    for (slot, item) in existing {
        let blocked = restrictions(item, *slot, robot_type)
            .into_iter()
            .any(|r| r.slot == new_slot && !r.is_allowed(new_item));
        if blocked {
            return Err(conflict(item, *slot, new_item, new_slot, robot_type));
        }
    }

    for restriction in restrictions(new_item, new_slot, robot_type) {
        if let Some(found) = existing.get(&restriction.slot) {
            if !restriction.is_allowed(found) {
                return Err(conflict(new_item, new_slot, found, restriction.slot, robot_type));
            }
        }
    }
    Ok(())
}

/// Slot-keyed deck items in the current state, skipping the given labware.
///
/// Labware on modules or other labware and off-deck labware are not mapped;
/// their height is part of the module underneath.
pub fn deck_items(view: &StateView, skip_labware: Option<&str>) -> BTreeMap<DeckSlot, DeckItem> {
    let geometry = view.geometry();
    let mut items = BTreeMap::new();

    for labware in view.labware().get_all() {
        if Some(labware.id.as_str()) == skip_labware {
            continue;
        }
        let LabwareLocation::Slot { slot_name } = &labware.location else {
            continue;
        };
        let Ok(definition) = view.labware().get_definition(&labware.id) else {
            continue;
        };
        let highest_z = geometry
            .get_labware_highest_z(&labware.id)
            .unwrap_or(definition.dimensions.z_dimension);
        items.insert(
            *slot_name,
            DeckItem::Labware {
                name: labware.load_name.clone(),
                highest_z,
                uri: labware.definition_uri.clone(),
                is_fixed_trash: definition.is_fixed_trash,
            },
        );
    }

    for module in view.modules().get_all() {
        let highest_z = geometry
            .get_module_highest_z(&module.id)
            .unwrap_or(module.model.overall_height());
        items.insert(
            module.slot,
            DeckItem::module(module.model, highest_z, module.semi_configuration),
        );
    }

    for slot in view.areas().trash_bin_slots() {
        items.insert(
            slot,
            DeckItem::TrashBin {
                name: "trash bin".to_string(),
                highest_z: TRASH_BIN_HEIGHT,
            },
        );
    }
    items
}

/// Check placing `definition` at `location`. `labware_id` names labware
/// being reloaded in place, which does not conflict with itself.
pub fn check_labware_candidate(
    view: &StateView,
    labware_id: Option<&str>,
    definition: &LabwareDefinition,
    location: &LabwareLocation,
) -> Result<(), DeckConflictError> {
    let LabwareLocation::Slot { slot_name } = location else {
        return Ok(());
    };
    let item = DeckItem::Labware {
        name: definition.load_name.clone(),
        highest_z: definition.dimensions.z_dimension,
        uri: definition.uri(),
        is_fixed_trash: definition.is_fixed_trash,
    };
    check(
        &deck_items(view, labware_id),
        &item,
        *slot_name,
        view.config().robot_type,
    )
}

pub fn check_module_candidate(
    view: &StateView,
    model: ModuleModel,
    slot: DeckSlot,
    is_semi: bool,
) -> Result<(), DeckConflictError> {
    let item = DeckItem::module(model, model.overall_height(), is_semi);
    check(&deck_items(view, None), &item, slot, view.config().robot_type)
}

/// Check a movable trash bin area before it is first used.
pub fn check_trash_bin_candidate(view: &StateView, area_name: &str) -> Result<(), DeckConflictError> {
    let Some(slot) = trash_bin_slot(area_name) else {
        return Ok(());
    };
    if view.areas().is_used(area_name) {
        return Ok(());
    }
    let item = DeckItem::TrashBin {
        name: "trash bin".to_string(),
        highest_z: TRASH_BIN_HEIGHT,
    };
    check(&deck_items(view, None), &item, slot, view.config().robot_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: u8) -> DeckSlot {
        DeckSlot::new(n).unwrap()
    }

    fn labware(name: &str, highest_z: f64) -> DeckItem {
        DeckItem::Labware {
            name: name.to_string(),
            highest_z,
            uri: format!("opentrons/{name}/1"),
            is_fixed_trash: false,
        }
    }

    fn fixed_trash() -> DeckItem {
        DeckItem::Labware {
            name: "opentrons_1_trash_1100ml_fixed".to_string(),
            highest_z: 82.0,
            uri: "opentrons/opentrons_1_trash_1100ml_fixed/1".to_string(),
            is_fixed_trash: true,
        }
    }

    fn deck(items: Vec<(u8, DeckItem)>) -> BTreeMap<DeckSlot, DeckItem> {
        items.into_iter().map(|(n, i)| (slot(n), i)).collect()
    }

    #[test]
    fn module_on_occupied_slot() {
        let existing = deck(vec![(1, labware("plate", 14.0))]);
        let module = DeckItem::module(ModuleModel::TemperatureModuleV2, 84.0, false);

        let err = check(&existing, &module, slot(1), RobotType::Ot2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "plate in slot 1 prevents temperatureModuleV2 from using slot 1."
        );
        assert!(check(&existing, &module, slot(3), RobotType::Ot2).is_ok());
    }

    #[test]
    fn flex_slot_names_in_message() {
        let existing = deck(vec![(1, labware("plate", 14.0))]);
        let err = check(&existing, &labware("other", 14.0), slot(1), RobotType::Flex).unwrap_err();
        assert_eq!(
            err.to_string(),
            "plate in slot D1 prevents other from using slot D1."
        );
    }

    #[test]
    fn thermocycler_covers_slots() {
        let tc = DeckItem::module(ModuleModel::ThermocyclerModuleV2, 108.96, false);
        let existing = deck(vec![(7, tc)]);
        for blocked in [7, 8, 10, 11] {
            assert!(check(&existing, &labware("plate", 14.0), slot(blocked), RobotType::Ot2).is_err());
        }
        assert!(check(&existing, &labware("plate", 14.0), slot(9), RobotType::Ot2).is_ok());

        let semi = DeckItem::module(ModuleModel::ThermocyclerModuleV1, 98.0, true);
        let existing = deck(vec![(7, semi)]);
        assert!(check(&existing, &labware("plate", 14.0), slot(10), RobotType::Ot2).is_err());
        assert!(check(&existing, &labware("plate", 14.0), slot(8), RobotType::Ot2).is_ok());

        let flex_tc = DeckItem::module(ModuleModel::ThermocyclerModuleV2, 108.96, false);
        let existing = deck(vec![(7, flex_tc)]);
        assert!(check(&existing, &labware("plate", 14.0), slot(10), RobotType::Flex).is_err());
        assert!(check(&existing, &labware("plate", 14.0), slot(8), RobotType::Flex).is_ok());
    }

    #[test]
    fn thermocycler_cannot_cover_existing_labware() {
        let existing = deck(vec![(11, labware("plate", 14.0))]);
        let tc = DeckItem::module(ModuleModel::ThermocyclerModuleV2, 108.96, false);
        let err = check(&existing, &tc, slot(7), RobotType::Ot2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "thermocyclerModuleV2 in slot 7 prevents plate from using slot 11."
        );
    }

    #[test]
    fn heater_shaker_neighbour_height() {
        let hs = DeckItem::module(ModuleModel::HeaterShakerModuleV1, 82.0, false);
        let existing = deck(vec![(4, hs.clone())]);

        assert!(check(&existing, &labware("short", 52.9), slot(5), RobotType::Ot2).is_ok());
        let err = check(&existing, &labware("tall", 53.0), slot(5), RobotType::Ot2).unwrap_err();
        assert!(err.to_string().starts_with("heaterShakerModuleV1 in slot 4"));
        // North and south only forbid modules.
        assert!(check(&existing, &labware("tall", 100.0), slot(7), RobotType::Ot2).is_ok());

        // Checked in both directions.
        let existing = deck(vec![(5, labware("tall", 60.0))]);
        assert!(check(&existing, &hs, slot(4), RobotType::Ot2).is_err());

        // Flex has no heater-shaker adjacency rules.
        let existing = deck(vec![(4, hs)]);
        assert!(check(&existing, &labware("tall", 60.0), slot(5), RobotType::Flex).is_ok());
    }

    #[test]
    fn heater_shaker_conflicts_name_the_source() {
        let hs = DeckItem::module(ModuleModel::HeaterShakerModuleV1, 82.0, false);

        let existing = deck(vec![(4, hs.clone())]);
        let err = check(&existing, &labware("tiprack", 64.5), slot(5), RobotType::Ot2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "heaterShakerModuleV1 in slot 4 prevents tiprack from using slot 5."
        );

        let existing = deck(vec![(5, labware("tiprack", 64.5))]);
        let err = check(&existing, &hs, slot(4), RobotType::Ot2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "heaterShakerModuleV1 in slot 4 prevents tiprack from using slot 5."
        );

        // A module placed on the heater-shaker's own slot is blocked by the
        // heater-shaker, not the other way round.
        let temp = DeckItem::module(ModuleModel::TemperatureModuleV2, 84.0, false);
        let existing = deck(vec![(4, hs)]);
        let err = check(&existing, &temp, slot(4), RobotType::Ot2).unwrap_err();
        assert_eq!(
            err.to_string(),
            "heaterShakerModuleV1 in slot 4 prevents temperatureModuleV2 from using slot 4."
        );
    }

    #[test]
    fn heater_shaker_forbids_adjacent_modules() {
        let hs = DeckItem::module(ModuleModel::HeaterShakerModuleV1, 82.0, false);
        let existing = deck(vec![(4, hs)]);
        let temp = DeckItem::module(ModuleModel::TemperatureModuleV2, 84.0, false);
        for neighbour in [1, 5, 7] {
            assert!(check(&existing, &temp, slot(neighbour), RobotType::Ot2).is_err());
        }
        assert!(check(&existing, &temp, slot(3), RobotType::Ot2).is_ok());
    }

    #[test]
    fn fixed_trash_is_replaceable() {
        let existing = deck(vec![(12, fixed_trash())]);
        assert!(check(&existing, &labware("plate", 14.0), slot(12), RobotType::Ot2).is_ok());

        let existing = deck(vec![(12, labware("plate", 14.0))]);
        assert!(check(&existing, &fixed_trash(), slot(12), RobotType::Ot2).is_ok());
    }

    #[test]
    fn trash_bin_claims_its_slot() {
        let existing = deck(vec![(
            12,
            DeckItem::TrashBin {
                name: "trash bin".to_string(),
                highest_z: TRASH_BIN_HEIGHT,
            },
        )]);
        let err = check(&existing, &labware("plate", 14.0), slot(12), RobotType::Flex).unwrap_err();
        assert_eq!(
            err.to_string(),
            "trash bin in slot A3 prevents plate from using slot A3."
        );
    }
}
