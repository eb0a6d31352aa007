//! Integration test: a protocol submitted as JSON and the shape of what
//! comes back.

use lhr_engine::prelude::*;
use serde_json::{Value, json};

use super::engine;

fn protocol() -> Value {
    json!([
        {"commandType": "home", "params": {}},
        {
            "commandType": "loadPipette",
            "params": {"pipetteName": "p300_single_gen2", "mount": "left", "pipetteId": "p1"}
        },
        {
            "commandType": "loadLabware",
            "params": {
                "loadName": "opentrons_96_tiprack_300ul",
                "location": {"kind": "slot", "slotName": "1"},
                "labwareId": "tips"
            }
        },
        {
            "commandType": "loadLabware",
            "params": {
                "loadName": "corning_96_wellplate_360ul_flat",
                "location": {"kind": "slot", "slotName": "2"},
                "labwareId": "plate"
            }
        },
        {
            "commandType": "pickUpTip",
            "params": {"pipetteId": "p1", "labwareId": "tips", "wellName": "A1"}
        },
        {
            "commandType": "aspirate",
            "key": "draw",
            "params": {
                "pipetteId": "p1",
                "labwareId": "plate",
                "wellName": "A1",
                "volume": 75.0,
                "flowRate": 92.86
            }
        },
        {
            "commandType": "dispense",
            "params": {
                "pipetteId": "p1",
                "labwareId": "plate",
                "wellName": "B1",
                "volume": 75.0,
                "wellLocation": {"origin": "bottom", "offset": {"x": 0, "y": 0, "z": 2}}
            }
        },
        {"commandType": "blowout", "params": {"pipetteId": "p1", "labwareId": "plate", "wellName": "B1"}},
        {"commandType": "dropTipInPlace", "params": {"pipetteId": "p1"}}
    ])
}

#[tokio::test]
async fn json_protocol_runs_to_completion() {
    let (mut engine, _) = engine(RobotType::Ot2, ApiVersion::LATEST);
    let creates: Vec<CommandCreate> = serde_json::from_value(protocol()).unwrap();
    for create in creates {
        engine.enqueue(create).unwrap();
    }
    assert_eq!(engine.queued_len(), 9);

    let completed = engine.run_until_idle().await.unwrap();
    assert_eq!(completed.len(), 9);
    for command in &completed {
        assert_eq!(
            command.status,
            CommandStatus::Succeeded,
            "{}: {:?}",
            command.command_type(),
            command.error
        );
        assert!(command.started_at.is_some());
        assert!(command.completed_at >= command.started_at);
    }
    assert_eq!(engine.commands().len(), 9);
    assert_eq!(engine.queued_len(), 0);
}

#[tokio::test]
async fn serialized_command_shape() {
    let (mut engine, _) = engine(RobotType::Ot2, ApiVersion::LATEST);
    let creates: Vec<CommandCreate> = serde_json::from_value(protocol()).unwrap();
    for create in creates.into_iter().take(6) {
        engine.execute(create).await.unwrap();
    }

    let draw = engine
        .commands()
        .iter()
        .find(|c| c.key == "draw")
        .unwrap();
    let value = serde_json::to_value(draw).unwrap();
    assert_eq!(value["commandType"], "aspirate");
    assert_eq!(value["status"], "succeeded");
    assert_eq!(value["params"]["pipetteId"], "p1");
    assert_eq!(value["params"]["volume"], json!(75.0));
    assert_eq!(value["result"]["volume"], json!(75.0));
    assert!(value["result"]["position"]["z"].is_number());
    assert!(value["error"].is_null());
    assert!(value["createdAt"].is_string());

    // Commands without a client key are keyed by their id.
    let first = serde_json::to_value(&engine.commands()[0]).unwrap();
    assert_eq!(first["key"], first["id"]);
}

#[tokio::test]
async fn failed_command_carries_error_occurrence() {
    let (mut engine, _) = engine(RobotType::Ot2, ApiVersion::LATEST);
    let creates: Vec<CommandCreate> = serde_json::from_value(protocol()).unwrap();
    // Skip the tip pick-up so the aspirate has no tip.
    for create in creates.into_iter().take(4) {
        engine.execute(create).await.unwrap();
    }
    let command = engine
        .execute(
            serde_json::from_value(json!({
                "commandType": "aspirate",
                "params": {"pipetteId": "p1", "labwareId": "plate", "wellName": "A1", "volume": 10.0}
            }))
            .unwrap(),
        )
        .await
        .unwrap();

    let value = serde_json::to_value(&command).unwrap();
    assert_eq!(value["status"], "failed");
    assert!(value["result"].is_null());
    assert_eq!(value["error"]["errorType"], "TipNotAttachedError");
    assert_eq!(value["error"]["errorCode"], "3000");
    assert!(value["error"]["detail"].as_str().unwrap().contains("p1"));
    assert!(value["error"]["wrappedErrors"].is_array());
}

#[test]
fn unknown_command_type_is_rejected_at_parse() {
    let parsed = serde_json::from_value::<CommandCreate>(json!({
        "commandType": "teleport",
        "params": {"pipetteId": "p1"}
    }));
    assert!(parsed.is_err());
}
