//! Integration test: outcome classification across a run.
//!
//! Defined errors commit their update, preconditions commit nothing and keep
//! the engine usable, fatal errors commit nothing and halt it.

use std::error::Error as _;

use lhr_common::hardware::{HardwareError, Mount};
use lhr_engine::prelude::*;
use lhr_hal::SimOperation;
use serde_json::json;

use super::{aspirate, create, dispense, engine, ot2_deck, pick_up, run, run_ok};

#[tokio::test]
async fn overpressure_commits_unknown_contents() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    ot2_deck(&mut engine).await;
    run_ok(&mut engine, pick_up("A1")).await;
    run_ok(&mut engine, aspirate("A1", 20.0)).await;

    handle.inject_overpressure(Mount::Left, SimOperation::Aspirate);
    let command = run(&mut engine, aspirate("A2", 30.0)).await;
    assert_eq!(command.status, CommandStatus::Failed);
    let occurrence = command.error.unwrap();
    assert_eq!(occurrence.error_type, "overpressure");
    assert_eq!(occurrence.wrapped_errors[0].error_type, "PipetteOverpressure");

    let at_failure = handle.position(Mount::Left);
    assert_eq!(
        occurrence.error_info["retryLocation"],
        json!([at_failure.x, at_failure.y, at_failure.z])
    );

    let view = engine.state_view();
    assert_eq!(view.pipettes().get_aspirated_volume("p1").unwrap(), None);
    assert_eq!(view.wells().get_operated_volume("plate", "A2"), None);
    assert_eq!(view.pipettes().get_deck_point("p1"), Some(at_failure));
    assert_eq!(engine.status(), EngineState::Idle);

    // Still usable: the next aspirate prepares the plunger again.
    run_ok(&mut engine, aspirate("A3", 10.0)).await;
    assert_eq!(handle.calls(SimOperation::PrepareForAspirate), 1);
}

#[tokio::test]
async fn dispense_overpressure_recovers_with_an_empty_plunger() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    ot2_deck(&mut engine).await;
    run_ok(&mut engine, pick_up("A1")).await;
    run_ok(&mut engine, aspirate("A1", 100.0)).await;

    handle.inject_overpressure(Mount::Left, SimOperation::Dispense);
    let command = run(&mut engine, dispense("B1", 40.0)).await;
    assert_eq!(command.status, CommandStatus::Failed);
    assert_eq!(command.error.unwrap().error_type, "overpressure");
    assert_eq!(
        engine.state_view().pipettes().get_aspirated_volume("p1").unwrap(),
        None
    );

    // The plunger is driven to the bottom again, so the simulator and the
    // engine both start from empty.
    run_ok(&mut engine, aspirate("A2", 80.0)).await;
    assert_eq!(engine.status(), EngineState::Idle);
    assert_eq!(handle.held_volume(Mount::Left), 80.0);
    assert_eq!(
        engine.state_view().pipettes().get_aspirated_volume("p1").unwrap(),
        Some(80.0)
    );
}

#[tokio::test]
async fn non_positive_flow_rate_is_a_precondition() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    ot2_deck(&mut engine).await;
    run_ok(&mut engine, pick_up("A1")).await;
    let before = engine.state_view();
    let moves = handle.calls(SimOperation::MoveTo);

    let command = run(
        &mut engine,
        json!({
            "commandType": "aspirate",
            "params": {
                "pipetteId": "p1",
                "labwareId": "plate",
                "wellName": "A1",
                "volume": 10.0,
                "flowRate": 0.0
            }
        }),
    )
    .await;
    assert_eq!(command.status, CommandStatus::Failed);
    assert_eq!(command.error.unwrap().error_type, "InvalidParamsError");
    assert_eq!(engine.state_view().state(), before.state());
    assert_eq!(handle.calls(SimOperation::MoveTo), moves);
    assert_eq!(engine.status(), EngineState::Idle);
}

#[tokio::test]
async fn missing_tip_after_pick_up() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    ot2_deck(&mut engine).await;
    handle.set_tip_sensor(Mount::Left, Some(false));

    let command = run(&mut engine, pick_up("A1")).await;
    assert_eq!(command.status, CommandStatus::Failed);
    assert_eq!(command.error.unwrap().error_type, "tipPhysicallyMissing");
    let view = engine.state_view();
    assert!(!view.pipettes().has_tip("p1"));
    assert!(!view.tips().has_clean_tip("tips", "A1"));
}

#[tokio::test]
async fn precondition_leaves_state_untouched() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    ot2_deck(&mut engine).await;
    let before = engine.state_view();
    let moves = handle.calls(SimOperation::MoveTo);

    let command = run(&mut engine, aspirate("A1", 10.0)).await;
    assert_eq!(command.status, CommandStatus::Failed);
    let occurrence = command.error.unwrap();
    assert_eq!(occurrence.error_type, "TipNotAttachedError");
    assert_eq!(occurrence.error_code, "3000");

    assert_eq!(engine.state_view().state(), before.state());
    assert_eq!(handle.calls(SimOperation::MoveTo), moves);
    assert_eq!(engine.status(), EngineState::Idle);
    run_ok(&mut engine, pick_up("A1")).await;
}

#[tokio::test]
async fn hardware_failure_halts_with_chain() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    ot2_deck(&mut engine).await;
    run_ok(&mut engine, pick_up("A1")).await;
    let before = engine.state_view();

    handle.inject_fault(
        SimOperation::MoveTo,
        HardwareError::MotionFailed("X axis stalled".to_string()),
    );
    let queued = engine.enqueue(create(aspirate("A2", 5.0))).unwrap();
    let trailing = engine.enqueue(create(aspirate("A3", 5.0))).unwrap();
    let err = engine.run_until_idle().await.unwrap_err();

    let EngineError::CommandFatal { command_id, .. } = &err else {
        panic!("expected fatal error, got {err}");
    };
    assert_eq!(command_id, &queued);
    let hardware = err.source().and_then(|command| command.source()).unwrap();
    assert_eq!(hardware.to_string(), "Motion failed: X axis stalled");

    let failed = engine.command(&queued).unwrap();
    assert_eq!(failed.status, CommandStatus::Fatal);
    let occurrence = failed.error.as_ref().unwrap();
    assert_eq!(occurrence.error_type, "HardwareError");
    assert_eq!(occurrence.wrapped_errors[0].error_type, "MotionFailed");

    assert_eq!(engine.state_view().state(), before.state());
    assert_eq!(engine.status(), EngineState::Halted);
    assert_eq!(
        engine.command(&trailing).unwrap().status,
        CommandStatus::Queued
    );
    assert!(matches!(
        engine.execute(create(json!({"commandType": "home", "params": {}}))).await,
        Err(EngineError::Halted)
    ));
}

#[tokio::test]
async fn stop_from_another_thread() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::LATEST);
    let home = || create(json!({"commandType": "home", "params": {}}));
    let first = engine.enqueue(home()).unwrap();
    let second = engine.enqueue(home()).unwrap();
    let third = engine.enqueue(home()).unwrap();

    engine.execute_next().await.unwrap();
    let stop = engine.stop_handle();
    std::thread::spawn(move || stop.stop()).join().unwrap();
    let rest = engine.run_until_idle().await.unwrap();

    assert!(rest.is_empty());
    assert_eq!(engine.status(), EngineState::Stopped);
    assert_eq!(engine.command(&first).unwrap().status, CommandStatus::Succeeded);
    for id in [&second, &third] {
        let command = engine.command(id).unwrap();
        assert_eq!(command.status, CommandStatus::Failed);
        assert_eq!(command.error.as_ref().unwrap().error_code, "4004");
    }
    assert_eq!(handle.calls(SimOperation::Home), 1);
}
