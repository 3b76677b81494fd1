//! End-to-end runs driven by the autopilot.
//!
//! Each test drives a fixture mission one-second round at a time and checks
//! that it reaches completion without a single rejected action.

use std::time::Duration;

use mission_control::{drive, ActionSource, Autopilot, AutopilotConfig, ScriptedSource};
use mission_core::test_fixtures::{
    checkpoint_definition, runtime_for, timed_definition, tool_event_definition,
};
use mission_core::{verify_replay, Action, MissionEvent, MissionRuntime, MissionStatus};

const MAX_ROUNDS: usize = 500;

/// Drive until terminal; returns the number of rounds it took.
fn run_to_end(runtime: &mut MissionRuntime, source: &mut impl ActionSource) -> usize {
    for round in 0..MAX_ROUNDS {
        let projection = drive(runtime, source, Duration::from_secs(1));
        if projection.status.is_terminal() {
            return round + 1;
        }
    }
    panic!("mission did not finish within {MAX_ROUNDS} rounds");
}

fn rejections(runtime: &MissionRuntime) -> Vec<String> {
    runtime
        .event_log()
        .iter()
        .filter(|entry| !entry.outcome.is_applied())
        .map(|entry| format!("seq {}: {}", entry.seq, entry.outcome.tag()))
        .collect()
}

#[test]
fn autopilot_completes_manual_mission() {
    let mut runtime = runtime_for(mission_core::test_fixtures::base_definition());
    let mut autopilot = Autopilot::default();
    run_to_end(&mut runtime, &mut autopilot);

    assert_eq!(runtime.state().status, MissionStatus::Completed);
    assert!(rejections(&runtime).is_empty(), "{:?}", rejections(&runtime));
}

#[test]
fn autopilot_confirms_ready_timed_step() {
    let mut runtime = runtime_for(timed_definition(10, false));
    let mut autopilot = Autopilot::default();
    run_to_end(&mut runtime, &mut autopilot);

    assert!(runtime.projection().is_complete);
    let focus = runtime
        .state()
        .step(&mission_core::StepId("focus".to_string()))
        .unwrap();
    assert!(focus.elapsed_secs() >= 10);
    assert!(rejections(&runtime).is_empty(), "{:?}", rejections(&runtime));
}

#[test]
fn autopilot_emits_tool_events_until_satisfied() {
    let mut runtime = runtime_for(tool_event_definition(3));
    let mut autopilot = Autopilot::new(AutopilotConfig {
        tool_event_every_ticks: 1,
        ..AutopilotConfig::default()
    });
    run_to_end(&mut runtime, &mut autopilot);

    let counted = runtime
        .event_log()
        .iter()
        .flat_map(|entry| &entry.effects)
        .filter(|effect| matches!(effect, MissionEvent::ToolEventCounted { .. }))
        .count();
    assert_eq!(counted, 3);
    assert!(runtime.projection().is_complete);
    assert!(rejections(&runtime).is_empty(), "{:?}", rejections(&runtime));
}

#[test]
fn autopilot_acknowledges_checkpoints() {
    let mut runtime = runtime_for(checkpoint_definition(2));
    let mut autopilot = Autopilot::new(AutopilotConfig {
        checkpoint_dwell_ticks: 2,
        ..AutopilotConfig::default()
    });
    run_to_end(&mut runtime, &mut autopilot);

    let closed = runtime.event_log().iter().any(|entry| {
        entry
            .effects
            .iter()
            .any(|effect| matches!(effect, MissionEvent::CheckpointClosed { .. }))
    });
    assert!(closed);
    assert!(runtime.projection().is_complete);
    assert!(rejections(&runtime).is_empty(), "{:?}", rejections(&runtime));
}

#[test]
fn autopilot_leaves_debrief_open_when_configured() {
    let mut runtime = runtime_for(mission_core::test_fixtures::base_definition());
    let mut autopilot = Autopilot::new(AutopilotConfig {
        complete_mission: false,
        ..AutopilotConfig::default()
    });
    for _ in 0..50 {
        drive(&mut runtime, &mut autopilot, Duration::from_secs(1));
    }
    assert_eq!(runtime.state().status, MissionStatus::Active);
    assert!((runtime.projection().progress - 1.0).abs() < 1e-9);
}

#[test]
fn autopilot_runs_replay_cleanly() {
    let mut runtime = runtime_for(checkpoint_definition(4));
    let mut autopilot = Autopilot::default();
    run_to_end(&mut runtime, &mut autopilot);
    assert_eq!(verify_replay(&runtime), Ok(()));
}

#[test]
fn scripted_abort_ends_the_run() {
    let mut runtime = runtime_for(timed_definition(60, true));
    let mut script = ScriptedSource::new(vec![
        (0, Action::Start),
        (3, Action::Pause),
        (5, Action::Resume),
        (
            8,
            Action::Abort {
                reason: "host closed".to_string(),
            },
        ),
    ]);
    let rounds = run_to_end(&mut runtime, &mut script);

    assert_eq!(rounds, 9);
    assert_eq!(runtime.state().status, MissionStatus::Aborted);
    assert_eq!(runtime.state().abort_reason.as_deref(), Some("host closed"));
    // Rounds 0 through 7 tick once each; paused rounds 3 and 4 do not count.
    assert_eq!(runtime.projection().elapsed_secs(), 6);
}
