//! Integration test: deck placement rules and out-of-band labware data.

use lhr_common::hardware::Point;
use lhr_engine::prelude::*;
use lhr_engine::resources::LabwareDefinition;
use lhr_engine::types::{DeckSlot, LabwareLocation};
use serde_json::json;

use super::{engine, ot2_deck, run, run_ok};

fn load_module(model: &str, slot: &str, id: &str) -> serde_json::Value {
    json!({
        "commandType": "loadModule",
        "params": {"model": model, "location": {"slotName": slot}, "moduleId": id}
    })
}

#[tokio::test]
async fn module_cannot_share_a_slot_with_labware() {
    let (mut engine, _) = engine(RobotType::Ot2, ApiVersion::LATEST);
    ot2_deck(&mut engine).await;

    let command = run(&mut engine, load_module("temperatureModuleV2", "2", "temp")).await;
    assert_eq!(command.status, CommandStatus::Failed);
    let occurrence = command.error.unwrap();
    assert_eq!(occurrence.error_type, "DeckConflictError");
    assert_eq!(
        occurrence.detail,
        "corning_96_wellplate_360ul_flat in slot 2 prevents temperatureModuleV2 from using slot 2."
    );
    assert!(engine.state_view().modules().get("temp").is_err());

    run_ok(&mut engine, load_module("temperatureModuleV2", "3", "temp")).await;
    run_ok(
        &mut engine,
        json!({
            "commandType": "loadLabware",
            "params": {
                "loadName": "nest_96_wellplate_200ul_flat",
                "location": {"kind": "module", "moduleId": "temp"},
                "labwareId": "cold"
            }
        }),
    )
    .await;
    assert_eq!(
        engine.state_view().labware().get_location("cold").unwrap(),
        &LabwareLocation::Module {
            module_id: "temp".to_string()
        }
    );
}

#[tokio::test]
async fn heater_shaker_limits_its_neighbours() {
    let (mut engine, _) = engine(RobotType::Ot2, ApiVersion::LATEST);
    run_ok(&mut engine, load_module("heaterShakerModuleV1", "4", "hs")).await;

    // Tip racks stand taller than a heater-shaker allows beside it.
    let tall = run(
        &mut engine,
        json!({
            "commandType": "loadLabware",
            "params": {
                "loadName": "opentrons_96_tiprack_300ul",
                "location": {"kind": "slot", "slotName": "5"}
            }
        }),
    )
    .await;
    assert_eq!(tall.status, CommandStatus::Failed);
    let occurrence = tall.error.unwrap();
    assert_eq!(occurrence.error_type, "DeckConflictError");
    assert_eq!(
        occurrence.detail,
        "heaterShakerModuleV1 in slot 4 prevents opentrons_96_tiprack_300ul from using slot 5."
    );

    // Front and back are fine for labware but not for another module.
    run_ok(
        &mut engine,
        json!({
            "commandType": "loadLabware",
            "params": {
                "loadName": "opentrons_96_tiprack_300ul",
                "location": {"kind": "slot", "slotName": "1"}
            }
        }),
    )
    .await;
    let module = run(&mut engine, load_module("temperatureModuleV2", "7", "temp")).await;
    assert_eq!(module.status, CommandStatus::Failed);
    assert_eq!(engine.status(), EngineState::Idle);
}

#[tokio::test]
async fn offsets_registered_out_of_band_apply_to_later_loads() {
    let (mut engine, _) = engine(RobotType::Ot2, ApiVersion::LATEST);
    let slot3 = LabwareLocation::Slot {
        slot_name: DeckSlot::new(3).unwrap(),
    };
    let offset = engine
        .add_labware_offset(
            "opentrons/corning_96_wellplate_360ul_flat/1",
            slot3.clone(),
            Point::new(0.5, -0.25, 1.0),
        )
        .unwrap();

    let command = run_ok(
        &mut engine,
        json!({
            "commandType": "loadLabware",
            "params": {
                "loadName": "corning_96_wellplate_360ul_flat",
                "location": {"kind": "slot", "slotName": "3"},
                "labwareId": "plate"
            }
        }),
    )
    .await;
    let result = serde_json::to_value(&command.result).unwrap();
    assert_eq!(result["offsetId"], json!(offset.id));

    let view = engine.state_view();
    assert_eq!(
        view.labware().get_offset_vector("plate").unwrap(),
        Point::new(0.5, -0.25, 1.0)
    );

    // Same definition elsewhere gets no offset.
    let elsewhere = run_ok(
        &mut engine,
        json!({
            "commandType": "loadLabware",
            "params": {
                "loadName": "corning_96_wellplate_360ul_flat",
                "location": {"kind": "slot", "slotName": "6"},
                "labwareId": "plate2"
            }
        }),
    )
    .await;
    let result = serde_json::to_value(&elsewhere.result).unwrap();
    assert_eq!(result["offsetId"], json!(null));
}

#[tokio::test]
async fn custom_definitions_load_by_namespace() {
    let (mut engine, _) = engine(RobotType::Ot2, ApiVersion::LATEST);
    let mut definition = LabwareDefinition::builtin("nest_12_reservoir_15ml").unwrap();
    definition.namespace = "custom_beta".to_string();
    definition.version = 2;
    let uri = engine.add_labware_definition(definition).unwrap();
    assert_eq!(uri, "custom_beta/nest_12_reservoir_15ml/2");

    let command = run_ok(
        &mut engine,
        json!({
            "commandType": "loadLabware",
            "params": {
                "loadName": "nest_12_reservoir_15ml",
                "namespace": "custom_beta",
                "version": 2,
                "location": {"kind": "slot", "slotName": "5"}
            }
        }),
    )
    .await;
    let result = serde_json::to_value(&command.result).unwrap();
    assert_eq!(result["definitionUri"], json!(uri));

    // Unregistered versions are not found.
    let missing = run(
        &mut engine,
        json!({
            "commandType": "loadLabware",
            "params": {
                "loadName": "nest_12_reservoir_15ml",
                "namespace": "custom_beta",
                "version": 3,
                "location": {"kind": "slot", "slotName": "6"}
            }
        }),
    )
    .await;
    assert_eq!(missing.status, CommandStatus::Failed);
}
