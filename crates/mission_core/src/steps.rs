//! Step progression: sequential unlock, explicit completion/skip, evaluator
//! results, and the phase derived from step progress.

use tracing::debug;

use crate::completion::{evaluate, Evaluation, StepSignal, Verdict};
use crate::tools::focus_tool;
use crate::{
    MissionDefinition, MissionEvent, MissionStatus, Phase, Rejection, RuntimeState, StepId,
    StepStatus, ToolId,
};

/// Unlock the first unfinished step and, while the mission is active, promote
/// it when nothing else is active. Steps after it stay locked.
pub(crate) fn run_activation(
    state: &mut RuntimeState,
    definition: &MissionDefinition,
    effects: &mut Vec<MissionEvent>,
) {
    let Some(next_id) = state
        .step_order
        .iter()
        .find(|id| state.steps.get(*id).is_some_and(|step| !step.status.is_done()))
        .cloned()
    else {
        return;
    };

    if state.steps.get(&next_id).map(|step| step.status) == Some(StepStatus::Locked) {
        set_step_status(state, &next_id, StepStatus::Available, effects);
    }

    let promotable = state.status == MissionStatus::Active
        && state.active_step_id.is_none()
        && state.steps.get(&next_id).map(|step| step.status) == Some(StepStatus::Available);
    if !promotable {
        return;
    }

    set_step_status(state, &next_id, StepStatus::Active, effects);
    state.active_step_id = Some(next_id.clone());

    if let Some(primary) = definition
        .step(&next_id)
        .and_then(|step| step.primary_tool_id.clone())
    {
        focus_tool(state, &primary, effects);
    }
}

/// Phase implied by step progress alone.
pub(crate) fn derive_phase(state: &RuntimeState) -> Phase {
    if state.all_steps_done() {
        Phase::Debrief
    } else if state.done_count() > 0 {
        Phase::Running
    } else {
        Phase::Briefing
    }
}

/// Bring `phase` in line with step progress. An open checkpoint owns the phase.
pub(crate) fn sync_phase(state: &mut RuntimeState, effects: &mut Vec<MissionEvent>) {
    if state.checkpoint.is_some() {
        return;
    }
    let to = derive_phase(state);
    let from = state.phase;
    if from != to {
        state.phase = to;
        debug!(run_id = %state.run_id, %from, %to, "phase changed");
        effects.push(MissionEvent::PhaseChanged { from, to });
    }
}

pub(crate) fn complete_current_step(
    state: &mut RuntimeState,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    let step_id = active_step_for_action(state)?;
    finish_active_step(state, &step_id, StepStatus::Completed, effects);
    Ok(())
}

/// Skip is only ever legal on the active step.
pub(crate) fn skip_current_step(
    state: &mut RuntimeState,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    let step_id = active_step_for_action(state)?;
    finish_active_step(state, &step_id, StepStatus::Skipped, effects);
    Ok(())
}

pub(crate) fn tool_event(
    state: &mut RuntimeState,
    definition: &MissionDefinition,
    tool_id: &ToolId,
    name: &str,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    require_unfrozen(state)?;
    require_no_checkpoint(state)?;
    if !definition.declares_tool(tool_id) {
        return Err(Rejection::UnknownToolId {
            tool_id: tool_id.clone(),
        });
    }
    let Some(step_id) = state.active_step_id.clone() else {
        return Ok(());
    };
    evaluate_active(
        state,
        definition,
        &step_id,
        StepSignal::ToolEvent { tool_id, name },
        effects,
    );
    Ok(())
}

pub(crate) fn advance_active_step(
    state: &mut RuntimeState,
    definition: &MissionDefinition,
    delta_ms: u64,
    effects: &mut Vec<MissionEvent>,
) {
    if let Some(step_id) = state.active_step_id.clone() {
        evaluate_active(
            state,
            definition,
            &step_id,
            StepSignal::Tick { delta_ms },
            effects,
        );
    }
}

fn evaluate_active(
    state: &mut RuntimeState,
    definition: &MissionDefinition,
    step_id: &StepId,
    signal: StepSignal<'_>,
    effects: &mut Vec<MissionEvent>,
) {
    let (Some(step), Some(step_state)) = (definition.step(step_id), state.steps.get(step_id))
    else {
        return;
    };
    let from = step_state.status;
    let Evaluation {
        state: next,
        verdict,
    } = evaluate(step, step_state, signal);
    if verdict == Verdict::Ignored {
        return;
    }

    let to = next.status;
    if let StepSignal::ToolEvent { name, .. } = signal {
        let count = next.event_counts.get(name).copied().unwrap_or(0);
        effects.push(MissionEvent::ToolEventCounted {
            step_id: step_id.clone(),
            name: name.to_string(),
            count,
        });
    }
    state.steps.insert(step_id.clone(), next);

    match verdict {
        Verdict::Ready => {
            debug!(run_id = %state.run_id, step = %step_id, "step ready for confirmation");
            effects.push(MissionEvent::StepReady {
                step_id: step_id.clone(),
            });
        }
        Verdict::Satisfied => {
            effects.push(MissionEvent::StepStatusChanged {
                step_id: step_id.clone(),
                from,
                to,
            });
            release_active(state, step_id, to);
        }
        Verdict::Ignored | Verdict::Progressed | Verdict::Counted(_) => {}
    }
}

fn finish_active_step(
    state: &mut RuntimeState,
    step_id: &StepId,
    to: StepStatus,
    effects: &mut Vec<MissionEvent>,
) {
    set_step_status(state, step_id, to, effects);
    release_active(state, step_id, to);
}

fn release_active(state: &mut RuntimeState, step_id: &StepId, to: StepStatus) {
    if let Some(step) = state.steps.get_mut(step_id) {
        step.ready = false;
    }
    if state.active_step_id.as_ref() == Some(step_id) {
        state.active_step_id = None;
    }
    debug!(run_id = %state.run_id, step = %step_id, status = %to, "step finished");
}

fn set_step_status(
    state: &mut RuntimeState,
    step_id: &StepId,
    to: StepStatus,
    effects: &mut Vec<MissionEvent>,
) {
    let Some(step) = state.steps.get_mut(step_id) else {
        return;
    };
    let from = step.status;
    if from == to {
        return;
    }
    step.status = to;
    effects.push(MissionEvent::StepStatusChanged {
        step_id: step_id.clone(),
        from,
        to,
    });
}

fn active_step_for_action(state: &RuntimeState) -> Result<StepId, Rejection> {
    require_unfrozen(state)?;
    require_no_checkpoint(state)?;
    state.active_step_id.clone().ok_or(Rejection::StepNotActive)
}

/// Steps hold still until the open checkpoint is acknowledged.
fn require_no_checkpoint(state: &RuntimeState) -> Result<(), Rejection> {
    match &state.checkpoint {
        Some(open) => Err(Rejection::CheckpointOpen {
            checkpoint_id: open.id.clone(),
        }),
        None => Ok(()),
    }
}

/// Step and tool state is frozen while paused.
pub(crate) fn require_unfrozen(state: &RuntimeState) -> Result<(), Rejection> {
    if state.status == MissionStatus::Paused {
        return Err(Rejection::MissionNotActive {
            status: state.status,
        });
    }
    Ok(())
}
