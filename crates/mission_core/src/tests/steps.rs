use super::*;

#[test]
fn complete_before_start_is_step_not_active() {
    let mut runtime = runtime_for(base_definition());
    runtime.complete_current_step();
    assert_eq!(last_rejection(&runtime), Some(Rejection::StepNotActive));
    assert_eq!(step_status(&runtime, "a"), StepStatus::Available);
}

#[test]
fn double_complete_after_last_step_is_step_not_active() {
    let mut runtime = started(base_definition());
    for _ in 0..3 {
        runtime.complete_current_step();
    }
    runtime.complete_current_step();
    assert_eq!(last_rejection(&runtime), Some(Rejection::StepNotActive));
}

#[test]
fn skip_marks_active_step_skipped_and_advances() {
    let mut runtime = started(base_definition());
    let projection = runtime.skip_current_step();
    assert_eq!(step_status(&runtime, "a"), StepStatus::Skipped);
    assert_eq!(projection.active_step_id, Some(step_id("b")));
    assert_eq!(projection.phase, Phase::Running);
    assert_eq!(projection.completed_steps, 1);
}

#[test]
fn skipping_every_step_reaches_debrief_and_allows_completion() {
    let mut runtime = started(base_definition());
    for _ in 0..3 {
        runtime.skip_current_step();
    }
    assert_eq!(runtime.state().phase, Phase::Debrief);
    assert_eq!(runtime.complete_mission().status, MissionStatus::Completed);
}

#[test]
fn later_steps_stay_locked_until_predecessor_finishes() {
    let mut runtime = started(base_definition());
    assert_eq!(step_status(&runtime, "b"), StepStatus::Locked);
    assert_eq!(step_status(&runtime, "c"), StepStatus::Locked);
    runtime.complete_current_step();
    assert_eq!(step_status(&runtime, "b"), StepStatus::Active);
    assert_eq!(step_status(&runtime, "c"), StepStatus::Locked);
}

#[test]
fn tool_event_step_completes_after_count() {
    let mut runtime = started(tool_event_definition(2));
    runtime.dispatch_tool_event(tool("quiz"), "submitted");
    assert_eq!(step_status(&runtime, "a"), StepStatus::Active);
    assert_eq!(
        runtime.state().steps[&step_id("a")].event_counts["submitted"],
        1
    );

    let projection = runtime.dispatch_tool_event(tool("quiz"), "submitted");
    assert_eq!(step_status(&runtime, "a"), StepStatus::Completed);
    assert_eq!(projection.active_step_id, Some(step_id("b")));
}

#[test]
fn unrelated_tool_events_are_applied_without_effect() {
    let mut runtime = started(tool_event_definition(1));
    runtime.dispatch_tool_event(tool("notes"), "submitted");
    runtime.dispatch_tool_event(tool("quiz"), "opened");

    let entries = runtime.event_log();
    let tail = &entries[entries.len() - 2..];
    assert!(tail.iter().all(|entry| entry.outcome.is_applied()));
    assert!(tail.iter().all(|entry| entry.effects.is_empty()));
    assert_eq!(step_status(&runtime, "a"), StepStatus::Active);
}

#[test]
fn tool_event_for_undeclared_tool_is_rejected() {
    let mut runtime = started(tool_event_definition(1));
    runtime.dispatch_tool_event(tool("undeclared.tool"), "submitted");
    assert!(matches!(
        last_rejection(&runtime),
        Some(Rejection::UnknownToolId { .. })
    ));
}

#[test]
fn manual_completion_overrides_tool_event_policy() {
    let mut runtime = started(tool_event_definition(5));
    runtime.complete_current_step();
    assert_eq!(step_status(&runtime, "a"), StepStatus::Completed);
}

#[test]
fn activating_step_focuses_its_primary_tool() {
    let mut definition = base_definition();
    definition.steps[1].primary_tool_id = Some(tool("timer"));
    let mut runtime = started(definition);
    assert_eq!(runtime.state().active_tool_id, None);

    let projection = runtime.complete_current_step();
    assert_eq!(projection.active_tool_id, Some(tool("timer")));
    assert_eq!(projection.open_tool_ids, vec![tool("notes"), tool("timer")]);
}

#[test]
fn first_step_primary_tool_is_focused_at_start() {
    let runtime = started(tool_event_definition(1));
    assert_eq!(runtime.state().active_tool_id, Some(tool("quiz")));
}
