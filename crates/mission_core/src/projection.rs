//! Read-only projections derived from `RuntimeState`. Recomputed on demand,
//! never stored in the state.

use serde::{Deserialize, Serialize};

use crate::{
    CheckpointId, MissionStatus, Outcome, Phase, RunId, RuntimeState, StepId, ToolId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub run_id: RunId,
    pub status: MissionStatus,
    pub phase: Phase,
    pub active_step_id: Option<StepId>,
    pub active_tool_id: Option<ToolId>,
    pub open_tool_ids: Vec<ToolId>,
    pub checkpoint: Option<CheckpointId>,
    pub completed_steps: usize,
    pub total_steps: usize,
    /// Completed-or-skipped steps over total steps, in `[0, 1]`.
    pub progress: f64,
    pub elapsed_ms: u64,
    pub is_complete: bool,
    pub last_outcome: Option<Outcome>,
}

impl Projection {
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ms / 1000
    }
}

pub fn project(state: &RuntimeState) -> Projection {
    let completed_steps = state.done_count();
    let total_steps = state.step_order.len();
    Projection {
        run_id: state.run_id.clone(),
        status: state.status,
        phase: state.phase,
        active_step_id: state.active_step_id.clone(),
        active_tool_id: state.active_tool_id.clone(),
        open_tool_ids: state.open_tool_ids.clone(),
        checkpoint: state.checkpoint.as_ref().map(|open| open.id.clone()),
        completed_steps,
        total_steps,
        progress: progress(completed_steps, total_steps),
        elapsed_ms: state.elapsed_ms(),
        is_complete: state.status == MissionStatus::Completed,
        last_outcome: state.event_log.last().map(|entry| entry.outcome.clone()),
    }
}

fn progress(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    done as f64 / total as f64
}
