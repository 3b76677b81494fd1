use std::collections::{BTreeMap, BTreeSet};

use crate::{
    MissionDefinition, MissionStatus, Phase, RunId, RuntimeState, StepId, StepState, StepStatus,
    ToolId,
};

impl RuntimeState {
    /// Fresh `idle/briefing` state: every step locked except the first.
    pub fn new(definition: &MissionDefinition, run_id: RunId) -> Self {
        let step_order: Vec<StepId> = definition.steps.iter().map(|step| step.id.clone()).collect();
        let steps: BTreeMap<StepId, StepState> = step_order
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let status = if index == 0 {
                    StepStatus::Available
                } else {
                    StepStatus::Locked
                };
                (id.clone(), StepState::new(status))
            })
            .collect();

        Self {
            run_id,
            status: MissionStatus::Idle,
            phase: Phase::Briefing,
            step_order,
            steps,
            active_step_id: None,
            open_tool_ids: Vec::new(),
            active_tool_id: None,
            checkpoint: None,
            fired_checkpoints: BTreeSet::new(),
            clock_ms: 0,
            started_at_ms: None,
            paused_accum_ms: 0,
            abort_reason: None,
            event_log: Vec::new(),
        }
    }

    pub fn step(&self, id: &StepId) -> Option<&StepState> {
        self.steps.get(id)
    }

    pub fn active_step(&self) -> Option<&StepState> {
        self.active_step_id.as_ref().and_then(|id| self.steps.get(id))
    }

    pub fn is_tool_open(&self, id: &ToolId) -> bool {
        self.open_tool_ids.contains(id)
    }

    /// Steps that are completed or skipped.
    pub fn done_count(&self) -> usize {
        self.steps.values().filter(|step| step.status.is_done()).count()
    }

    pub fn all_steps_done(&self) -> bool {
        self.steps.values().all(|step| step.status.is_done())
    }

    /// Mission time since start, excluding paused intervals. Zero before start.
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at_ms.map_or(0, |started| {
            self.clock_ms
                .saturating_sub(started)
                .saturating_sub(self.paused_accum_ms)
        })
    }
}
