use tracing::{debug, warn};

use crate::checkpoint::{acknowledge, fire_due_checkpoint};
use crate::steps::{
    advance_active_step, complete_current_step, run_activation, skip_current_step, sync_phase,
    tool_event,
};
use crate::tools::{close_tool, open_required_tools, open_tool, set_active_tool};
use crate::{
    Action, LogEntry, MissionDefinition, MissionEvent, MissionStatus, Outcome, Phase, Registry,
    Rejection, RuntimeState,
};

/// Read-only collaborators the reducer consults.
#[derive(Debug, Clone, Copy)]
pub struct ReduceContext<'a> {
    pub definition: &'a MissionDefinition,
    /// When present, `OpenTool` also requires the tool to be registered.
    pub registry: Option<&'a Registry>,
}

/// Apply one action and append exactly one entry to the event log.
///
/// Order of operations for an accepted action:
/// 1. Run the action's handler (validation happens before any mutation).
/// 2. Re-run step activation.
/// 3. Recompute the phase from step progress (unless a checkpoint is open).
///
/// A rejected action leaves every field except `event_log` untouched.
pub fn apply<'s>(
    state: &'s mut RuntimeState,
    ctx: ReduceContext<'_>,
    action: Action,
) -> &'s LogEntry {
    let mut effects = Vec::new();
    let outcome = match reduce(state, ctx, &action, &mut effects) {
        Ok(()) => {
            run_activation(state, ctx.definition, &mut effects);
            sync_phase(state, &mut effects);
            Outcome::Applied
        }
        Err(reason) => {
            warn!(
                run_id = %state.run_id,
                seq = state.event_log.len(),
                action = action.label(),
                %reason,
                "action rejected"
            );
            effects.clear();
            Outcome::Rejected { reason }
        }
    };

    let index = state.event_log.len();
    state.event_log.push(LogEntry {
        seq: index as u64,
        at_ms: state.clock_ms,
        action,
        outcome,
        effects,
    });
    &state.event_log[index]
}

fn reduce(
    state: &mut RuntimeState,
    ctx: ReduceContext<'_>,
    action: &Action,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    if state.status.is_terminal() {
        return Err(Rejection::TerminalState {
            status: state.status,
        });
    }

    match action {
        Action::Start => start(state, ctx, effects),
        Action::Pause => transition(
            state,
            action,
            MissionStatus::Active,
            MissionStatus::Paused,
            effects,
        ),
        Action::Resume => transition(
            state,
            action,
            MissionStatus::Paused,
            MissionStatus::Active,
            effects,
        ),
        Action::CompleteMission => complete_mission(state, action, effects),
        Action::Abort { reason } => {
            state.abort_reason = Some(reason.clone());
            set_status(state, MissionStatus::Aborted, effects);
            Ok(())
        }
        Action::CompleteCurrentStep => complete_current_step(state, effects),
        Action::SkipCurrentStep => skip_current_step(state, effects),
        Action::ToolEvent { tool_id, name } => {
            tool_event(state, ctx.definition, tool_id, name, effects)
        }
        Action::OpenTool { tool_id } => open_tool(state, ctx, tool_id, effects),
        Action::SetActiveTool { tool_id } => set_active_tool(state, tool_id, effects),
        Action::CloseTool { tool_id } => close_tool(state, tool_id, effects),
        Action::AckCheckpoint { checkpoint_id } => acknowledge(state, checkpoint_id, effects),
        Action::Tick { delta_ms } => {
            tick(state, ctx.definition, *delta_ms, effects);
            Ok(())
        }
    }
}

fn start(
    state: &mut RuntimeState,
    ctx: ReduceContext<'_>,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    if state.status != MissionStatus::Idle {
        return Err(illegal(state, &Action::Start));
    }
    state.started_at_ms = Some(state.clock_ms);
    set_status(state, MissionStatus::Active, effects);
    open_required_tools(state, ctx.definition, effects);
    Ok(())
}

fn transition(
    state: &mut RuntimeState,
    action: &Action,
    from: MissionStatus,
    to: MissionStatus,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    if state.status != from {
        return Err(illegal(state, action));
    }
    set_status(state, to, effects);
    Ok(())
}

fn complete_mission(
    state: &mut RuntimeState,
    action: &Action,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    let legal = state.status == MissionStatus::Active
        && state.phase == Phase::Debrief
        && state.all_steps_done();
    if !legal {
        return Err(illegal(state, action));
    }
    set_status(state, MissionStatus::Completed, effects);
    Ok(())
}

/// Advance the mission clock.
///
/// Idle: clock only. Paused: clock and paused accumulator. Active: clock, then
/// the active step's timer (frozen while a checkpoint is open), then step
/// activation and phase, then at most one due checkpoint.
fn tick(
    state: &mut RuntimeState,
    definition: &MissionDefinition,
    delta_ms: u64,
    effects: &mut Vec<MissionEvent>,
) {
    state.clock_ms = state.clock_ms.saturating_add(delta_ms);
    match state.status {
        MissionStatus::Paused => {
            state.paused_accum_ms = state.paused_accum_ms.saturating_add(delta_ms);
        }
        MissionStatus::Active => {
            if state.checkpoint.is_some() {
                return;
            }
            advance_active_step(state, definition, delta_ms, effects);
            run_activation(state, definition, effects);
            sync_phase(state, effects);
            fire_due_checkpoint(state, definition, effects);
        }
        MissionStatus::Idle | MissionStatus::Completed | MissionStatus::Aborted => {}
    }
}

pub(crate) fn set_status(
    state: &mut RuntimeState,
    to: MissionStatus,
    effects: &mut Vec<MissionEvent>,
) {
    let from = state.status;
    if from == to {
        return;
    }
    state.status = to;
    debug!(run_id = %state.run_id, %from, %to, "mission status changed");
    effects.push(MissionEvent::StatusChanged { from, to });
}

pub(crate) fn illegal(state: &RuntimeState, action: &Action) -> Rejection {
    Rejection::IllegalTransition {
        action: action.label().to_string(),
        status: state.status,
    }
}
