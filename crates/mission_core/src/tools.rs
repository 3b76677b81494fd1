//! Tool open/focus/close bookkeeping.

use crate::engine::ReduceContext;
use crate::steps::require_unfrozen;
use crate::{MissionDefinition, MissionEvent, Rejection, RuntimeState, ToolId};

pub(crate) fn open_tool(
    state: &mut RuntimeState,
    ctx: ReduceContext<'_>,
    tool_id: &ToolId,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    require_unfrozen(state)?;
    let declared = ctx.definition.declares_tool(tool_id);
    let registered = ctx
        .registry
        .is_none_or(|registry| registry.get_tool(tool_id).is_some());
    if !declared || !registered {
        return Err(Rejection::UnknownToolId {
            tool_id: tool_id.clone(),
        });
    }
    focus_tool(state, tool_id, effects);
    Ok(())
}

pub(crate) fn set_active_tool(
    state: &mut RuntimeState,
    tool_id: &ToolId,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    require_unfrozen(state)?;
    if !state.is_tool_open(tool_id) {
        return Err(Rejection::ToolNotOpen {
            tool_id: tool_id.clone(),
        });
    }
    focus_tool(state, tool_id, effects);
    Ok(())
}

/// Closing the focused tool clears focus; no other tool is promoted.
pub(crate) fn close_tool(
    state: &mut RuntimeState,
    tool_id: &ToolId,
    effects: &mut Vec<MissionEvent>,
) -> Result<(), Rejection> {
    require_unfrozen(state)?;
    if !state.is_tool_open(tool_id) {
        return Err(Rejection::ToolNotOpen {
            tool_id: tool_id.clone(),
        });
    }
    state.open_tool_ids.retain(|open| open != tool_id);
    let was_active = state.active_tool_id.as_ref() == Some(tool_id);
    if was_active {
        state.active_tool_id = None;
    }
    effects.push(MissionEvent::ToolClosed {
        tool_id: tool_id.clone(),
        was_active,
    });
    Ok(())
}

/// Open (if needed) and focus a tool the caller already validated.
pub(crate) fn focus_tool(
    state: &mut RuntimeState,
    tool_id: &ToolId,
    effects: &mut Vec<MissionEvent>,
) {
    open_unfocused(state, tool_id, effects);
    if state.active_tool_id.as_ref() != Some(tool_id) {
        state.active_tool_id = Some(tool_id.clone());
        effects.push(MissionEvent::ToolFocused {
            tool_id: tool_id.clone(),
        });
    }
}

pub(crate) fn open_required_tools(
    state: &mut RuntimeState,
    definition: &MissionDefinition,
    effects: &mut Vec<MissionEvent>,
) {
    for tool in definition.tools.iter().filter(|tool| tool.required) {
        open_unfocused(state, &tool.tool_id, effects);
    }
}

fn open_unfocused(state: &mut RuntimeState, tool_id: &ToolId, effects: &mut Vec<MissionEvent>) {
    if state.is_tool_open(tool_id) {
        return;
    }
    state.open_tool_ids.push(tool_id.clone());
    effects.push(MissionEvent::ToolOpened {
        tool_id: tool_id.clone(),
    });
}
