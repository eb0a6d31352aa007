//! Shared fixtures for the engine integration tests.

mod deck_layout;
mod outcomes;
mod protocol_run;
mod volume_semantics;
mod wire_contract;

use lhr_engine::prelude::*;
use lhr_engine::resources::SequentialModelUtils;
use lhr_hal::{SimulatedHardware, SimulationHandle};
use serde_json::{Value, json};

pub fn engine(robot_type: RobotType, api_version: ApiVersion) -> (CommandEngine, SimulationHandle) {
    let hardware = SimulatedHardware::default();
    let handle = hardware.handle();
    let engine = CommandEngine::new(
        Box::new(hardware),
        EngineConfig::new(robot_type, api_version),
    )
    .with_model_utils(SequentialModelUtils::new("it"));
    (engine, handle)
}

pub fn create(value: Value) -> CommandCreate {
    serde_json::from_value(value).unwrap()
}

pub async fn run(engine: &mut CommandEngine, value: Value) -> Command {
    engine.execute(create(value)).await.unwrap()
}

/// Run and assert success.
pub async fn run_ok(engine: &mut CommandEngine, value: Value) -> Command {
    let command = run(engine, value).await;
    assert_eq!(
        command.status,
        CommandStatus::Succeeded,
        "{} failed: {:?}",
        command.command_type(),
        command.error
    );
    command
}

/// Homed OT-2 with `p1` (P300 single) on the left, a 300 µL tip rack `tips`
/// in slot 1 and a 96-well plate `plate` in slot 2.
pub async fn ot2_deck(engine: &mut CommandEngine) {
    run_ok(engine, json!({"commandType": "home", "params": {}})).await;
    run_ok(
        engine,
        json!({
            "commandType": "loadPipette",
            "params": {"pipetteName": "p300_single_gen2", "mount": "left", "pipetteId": "p1"}
        }),
    )
    .await;
    run_ok(
        engine,
        json!({
            "commandType": "loadLabware",
            "params": {
                "loadName": "opentrons_96_tiprack_300ul",
                "location": {"kind": "slot", "slotName": "1"},
                "labwareId": "tips"
            }
        }),
    )
    .await;
    run_ok(
        engine,
        json!({
            "commandType": "loadLabware",
            "params": {
                "loadName": "corning_96_wellplate_360ul_flat",
                "location": {"kind": "slot", "slotName": "2"},
                "labwareId": "plate"
            }
        }),
    )
    .await;
}

pub fn pick_up(well: &str) -> Value {
    json!({
        "commandType": "pickUpTip",
        "params": {"pipetteId": "p1", "labwareId": "tips", "wellName": well}
    })
}

pub fn aspirate(well: &str, volume: f64) -> Value {
    json!({
        "commandType": "aspirate",
        "params": {"pipetteId": "p1", "labwareId": "plate", "wellName": well, "volume": volume}
    })
}

pub fn dispense(well: &str, volume: f64) -> Value {
    json!({
        "commandType": "dispense",
        "params": {"pipetteId": "p1", "labwareId": "plate", "wellName": well, "volume": volume}
    })
}
