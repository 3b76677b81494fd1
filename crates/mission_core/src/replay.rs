//! Replay of a recorded event log.
//!
//! The reducer is deterministic, so re-dispatching every logged action into a
//! fresh state must reproduce each entry (outcome and effects) and the final
//! state exactly.

use crate::engine::{apply, ReduceContext};
use crate::{
    LogEntry, MissionRuntime, Registry, ReplayError, RunId, RuntimeState, ValidatedDefinition,
};

/// Rebuild the state a log describes, checking every entry along the way.
pub fn replay(
    definition: &ValidatedDefinition,
    registry: Option<&Registry>,
    run_id: RunId,
    log: &[LogEntry],
) -> Result<RuntimeState, ReplayError> {
    let mut state = RuntimeState::new(definition, run_id);
    let ctx = ReduceContext {
        definition,
        registry,
    };

    for (index, recorded) in (0u64..).zip(log) {
        if recorded.seq != index {
            return Err(ReplayError::SequenceGap {
                index,
                found: recorded.seq,
            });
        }
        let replayed = apply(&mut state, ctx, recorded.action.clone());
        if replayed != recorded {
            return Err(ReplayError::diverged(recorded, replayed));
        }
    }
    Ok(state)
}

/// Replay a live runtime's own log and require the rebuilt state to match it.
pub fn verify_replay(runtime: &MissionRuntime) -> Result<(), ReplayError> {
    let rebuilt = replay(
        runtime.definition(),
        runtime.registry(),
        runtime.run_id().clone(),
        runtime.event_log(),
    )?;
    if rebuilt != *runtime.state() {
        return Err(ReplayError::StateMismatch);
    }
    Ok(())
}
