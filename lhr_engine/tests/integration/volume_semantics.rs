//! Integration test: version-gated meaning of a zero volume.
//!
//! Before API 2.16 a volume of 0 means "all available" on aspirate and "all
//! held" on dispense. From 2.16 it is a literal zero.

use lhr_common::hardware::Mount;
use lhr_engine::prelude::*;
use lhr_hal::SimOperation;

use super::{aspirate, dispense, engine, ot2_deck, pick_up, run, run_ok};

fn realized_volume(command: &Command) -> f64 {
    match &command.result {
        Some(CommandResult::Aspirate(result)) => result.volume,
        Some(CommandResult::Dispense(result)) => result.volume,
        other => panic!("unexpected result {other:?}"),
    }
}

#[tokio::test]
async fn legacy_zero_takes_everything_available() {
    let (mut engine, _handle) = engine(RobotType::Ot2, ApiVersion::new(2, 15));
    ot2_deck(&mut engine).await;
    run_ok(&mut engine, pick_up("A1")).await;
    run_ok(&mut engine, aspirate("A1", 100.0)).await;

    let command = run_ok(&mut engine, aspirate("A1", 0.0)).await;
    assert_eq!(realized_volume(&command), 200.0);

    let command = run_ok(&mut engine, dispense("B1", 0.0)).await;
    assert_eq!(realized_volume(&command), 300.0);
    assert_eq!(
        engine.state_view().wells().get_operated_volume("plate", "B1"),
        Some(300.0)
    );
}

#[tokio::test]
async fn zero_is_literal_from_2_16() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::new(2, 16));
    ot2_deck(&mut engine).await;
    run_ok(&mut engine, pick_up("A1")).await;
    run_ok(&mut engine, aspirate("A1", 100.0)).await;

    let command = run_ok(&mut engine, aspirate("A1", 0.0)).await;
    assert_eq!(realized_volume(&command), 0.0);
    assert_eq!(handle.held_volume(Mount::Left), 100.0);

    let command = run_ok(&mut engine, dispense("B1", 0.0)).await;
    assert_eq!(realized_volume(&command), 0.0);
    assert_eq!(
        engine.state_view().pipettes().get_aspirated_volume("p1").unwrap(),
        Some(100.0)
    );
}

#[tokio::test]
async fn legacy_zero_overpressure_matches_explicit_volume() {
    async fn overpressured(volume: f64) -> (Command, CommandEngine) {
        let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::new(2, 15));
        ot2_deck(&mut engine).await;
        run_ok(&mut engine, pick_up("A1")).await;
        handle.inject_overpressure(Mount::Left, SimOperation::Aspirate);
        let command = run(&mut engine, aspirate("A1", volume)).await;
        (command, engine)
    }

    let (implicit, implicit_engine) = overpressured(0.0).await;
    let (explicit, explicit_engine) = overpressured(300.0).await;

    for (command, engine) in [(&implicit, &implicit_engine), (&explicit, &explicit_engine)] {
        assert_eq!(command.status, CommandStatus::Failed);
        assert_eq!(command.error.as_ref().unwrap().error_type, "overpressure");
        let view = engine.state_view();
        assert_eq!(view.pipettes().get_aspirated_volume("p1").unwrap(), None);
        assert_eq!(view.wells().get_operated_volume("plate", "A1"), None);
    }
    assert_eq!(
        implicit_engine.state_view().state(),
        explicit_engine.state_view().state()
    );
}

#[tokio::test]
async fn legacy_zero_dispense_with_unknown_contents_is_rejected() {
    let (mut engine, handle) = engine(RobotType::Ot2, ApiVersion::new(2, 15));
    ot2_deck(&mut engine).await;
    run_ok(&mut engine, pick_up("A1")).await;
    run_ok(&mut engine, aspirate("A1", 50.0)).await;
    handle.inject_overpressure(Mount::Left, SimOperation::Dispense);
    run(&mut engine, dispense("B1", 20.0)).await;

    let command = run(&mut engine, dispense("B1", 0.0)).await;
    assert_eq!(command.status, CommandStatus::Failed);
    assert_eq!(
        command.error.unwrap().error_type,
        "UnknownPipetteVolumeError"
    );
    assert_eq!(engine.status(), EngineState::Idle);
}
