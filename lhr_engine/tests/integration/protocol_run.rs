//! Integration test: a complete transfer run.
//!
//! home → load pipette and labware → pick up tip → aspirate → dispense →
//! blow out → drop tip, checking derived state after each step.

use lhr_engine::prelude::*;
use lhr_engine::state::{FluidKind, FluidSegment};
use lhr_engine::types::LogicalLocation;
use lhr_hal::SimOperation;
use lhr_common::hardware::Mount;
use serde_json::json;

use super::{aspirate, dispense, engine, ot2_deck, pick_up, run_ok};

#[tokio::test]
async fn single_channel_transfer() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    ot2_deck(&mut engine).await;

    run_ok(&mut engine, pick_up("A1")).await;
    let view = engine.state_view();
    assert!(view.pipettes().has_tip("p1"));
    assert_eq!(view.pipettes().get_active_channels("p1").unwrap(), 1);
    assert_eq!(
        view.tips().get_next_tip("tips", 1, None, None).as_deref(),
        Some("B1")
    );

    let command = run_ok(&mut engine, aspirate("A1", 10.0)).await;
    let view = engine.state_view();
    assert_eq!(
        view.pipettes().get_fluid("p1").unwrap().unwrap().segments(),
        &[FluidSegment {
            kind: FluidKind::Liquid,
            volume: 10.0
        }]
    );
    assert_eq!(
        view.pipettes().get_current_location().unwrap().location,
        LogicalLocation::well("plate", "A1")
    );
    assert_eq!(view.wells().get_operated_volume("plate", "A1"), Some(-10.0));
    let Some(CommandResult::Aspirate(result)) = command.result else {
        panic!("expected aspirate result");
    };
    assert_eq!(handle.position(Mount::Left), result.position);
    assert_eq!(handle.held_volume(Mount::Left), 10.0);

    run_ok(&mut engine, aspirate("A1", 15.0)).await;
    assert_eq!(
        engine
            .state_view()
            .pipettes()
            .get_aspirated_volume("p1")
            .unwrap(),
        Some(25.0)
    );

    run_ok(&mut engine, dispense("B1", 25.0)).await;
    let view = engine.state_view();
    assert_eq!(view.pipettes().get_aspirated_volume("p1").unwrap(), Some(0.0));
    assert_eq!(view.wells().get_operated_volume("plate", "B1"), Some(25.0));
    assert_eq!(view.wells().get_operated_volume("plate", "A1"), Some(-25.0));

    run_ok(
        &mut engine,
        json!({
            "commandType": "blowout",
            "params": {"pipetteId": "p1", "labwareId": "plate", "wellName": "B1"}
        }),
    )
    .await;
    let view = engine.state_view();
    assert!(view.pipettes().get_fluid("p1").unwrap().is_none());
    assert!(!view.pipettes().get_ready_to_aspirate("p1").unwrap());

    // Contents unknown: the next aspirate re-prepares the plunger first.
    run_ok(&mut engine, aspirate("C1", 5.0)).await;
    assert_eq!(handle.calls(SimOperation::PrepareForAspirate), 1);

    run_ok(
        &mut engine,
        json!({
            "commandType": "dropTip",
            "params": {"pipetteId": "p1", "labwareId": "tips", "wellName": "A1"}
        }),
    )
    .await;
    let view = engine.state_view();
    assert!(!view.pipettes().has_tip("p1"));
    assert!(!handle.has_tip(Mount::Left));

    assert_eq!(engine.commands().len(), 11);
    assert!(
        engine
            .commands()
            .iter()
            .all(|c| c.status == CommandStatus::Succeeded)
    );
    assert_eq!(engine.status(), EngineState::Idle);
}

#[tokio::test]
async fn exhausted_rack_and_reset() {
    let (mut engine, _handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    ot2_deck(&mut engine).await;

    for _ in 0..96 {
        let next = engine
            .state_view()
            .tips()
            .get_next_tip("tips", 1, None, None)
            .unwrap();
        run_ok(&mut engine, pick_up(&next)).await;
        run_ok(
            &mut engine,
            json!({"commandType": "dropTipInPlace", "params": {"pipetteId": "p1"}}),
        )
        .await;
    }
    assert_eq!(
        engine.state_view().tips().get_next_tip("tips", 1, None, None),
        None
    );

    run_ok(
        &mut engine,
        json!({"commandType": "resetTips", "params": {"labwareId": "tips"}}),
    )
    .await;
    assert_eq!(
        engine
            .state_view()
            .tips()
            .get_next_tip("tips", 1, None, None)
            .as_deref(),
        Some("A1")
    );
}

#[tokio::test]
async fn readers_see_only_committed_snapshots() {
    let (mut engine, _handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    let reader = engine.state_reader();
    let before = reader.view();
    ot2_deck(&mut engine).await;

    assert!(before.pipettes().get("p1").is_err());
    let after = std::thread::spawn(move || reader.view().pipettes().get("p1").is_ok())
        .join()
        .unwrap();
    assert!(after);
}
