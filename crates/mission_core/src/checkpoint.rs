//! Time-triggered checkpoints.
//!
//! A checkpoint fires once, when mission elapsed time crosses its threshold,
//! and holds the phase until acknowledged by id.

use tracing::debug;

use crate::{
    CheckpointId, MissionDefinition, MissionEvent, OpenCheckpoint, Phase, Rejection, RuntimeState,
};

/// Open the first unfired checkpoint whose threshold has been crossed. At most
/// one opens per call; none open during debrief or while one is already open.
pub(crate) fn fire_due_checkpoint(
    state: &mut RuntimeState,
    definition: &MissionDefinition,
    effects: &mut Vec<MissionEvent>,
) {
    if state.checkpoint.is_some() || state.phase == Phase::Debrief {
        return;
    }
    let elapsed_ms = state.elapsed_ms();
    let Some(due) = definition.checkpoints.iter().find(|checkpoint| {
        !state.fired_checkpoints.contains(&checkpoint.id)
            && elapsed_ms >= checkpoint.trigger.threshold_ms()
    }) else {
        return;
    };

    let interrupted_phase = state.phase;
    state.fired_checkpoints.insert(due.id.clone());
    state.checkpoint = Some(OpenCheckpoint {
        id: due.id.clone(),
        opened_at_ms: state.clock_ms,
        interrupted_phase,
    });
    state.phase = Phase::Checkpoint;
    debug!(run_id = %state.run_id, checkpoint = %due.id, elapsed_ms, "checkpoint opened");
    effects.push(MissionEvent::CheckpointOpened {
        checkpoint_id: due.id.clone(),
    });
    effects.push(MissionEvent::PhaseChanged {
        from: interrupted_phase,
        to: Phase::Checkpoint,
    });
}

/// Close the open checkpoint if `id` matches it and return to the phase it
/// interrupted.
pub(crate) fn acknowledge(
    state: &mut RuntimeState,
    id: &CheckpointId,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    let open = match state.checkpoint.take() {
        Some(open) if open.id == *id => open,
        other => {
            let open = other.as_ref().map(|checkpoint| checkpoint.id.clone());
            state.checkpoint = other;
            return Err(Rejection::CheckpointMismatch {
                open,
                requested: id.clone(),
            });
        }
    };
    debug!(run_id = %state.run_id, checkpoint = %id, "checkpoint acknowledged");
    effects.push(MissionEvent::CheckpointClosed {
        checkpoint_id: id.clone(),
    });
    let from = state.phase;
    state.phase = open.interrupted_phase;
    if from != state.phase {
        effects.push(MissionEvent::PhaseChanged {
            from,
            to: state.phase,
        });
    }
    Ok(())
}
