use super::*;
use crate::test_fixtures::{
    base_definition, base_registry, checkpoint_definition, runtime_for, timed_definition,
    tool_event_definition,
};
use std::time::Duration;

mod steps;
mod tools;

// --- Shared test helpers ------------------------------------------------

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn step_id(id: &str) -> StepId {
    StepId(id.to_string())
}

fn tool(id: &str) -> ToolId {
    ToolId(id.to_string())
}

fn step_status(runtime: &MissionRuntime, id: &str) -> StepStatus {
    runtime.state().steps[&step_id(id)].status
}

fn last_rejection(runtime: &MissionRuntime) -> Option<Rejection> {
    runtime
        .last_entry()
        .and_then(|entry| entry.outcome.rejection().cloned())
}

/// Runtime for `definition` that has already been started.
fn started(definition: MissionDefinition) -> MissionRuntime {
    let mut runtime = runtime_for(definition);
    runtime.start_mission();
    runtime
}

/// Everything in the state except the log, for immutability checks.
fn without_log(state: &RuntimeState) -> RuntimeState {
    RuntimeState {
        event_log: Vec::new(),
        ..state.clone()
    }
}
