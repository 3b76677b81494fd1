//! `MissionRuntime`: the dispatcher that owns one run's state.
//!
//! Every operation is synchronous, runs to completion, and returns the fresh
//! projection. Rejections are recorded in the event log rather than returned
//! as errors; inspect [`MissionRuntime::last_entry`] to see how an operation
//! fared.

use std::sync::Arc;
use std::time::Duration;

use crate::engine::{apply, ReduceContext};
use crate::projection::{project, Projection};
use crate::{
    Action, CheckpointId, LogEntry, MissionDefinition, Registry, RunId, RuntimeState, StepState,
    ToolDecl, ToolId, ValidatedDefinition,
};

#[derive(Debug, Clone)]
pub struct MissionRuntime {
    definition: ValidatedDefinition,
    registry: Option<Arc<Registry>>,
    state: RuntimeState,
}

/// Explicit context handed to a tool panel in place of ambient globals.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    pub run_id: &'a RunId,
    pub definition: &'a MissionDefinition,
    pub state: &'a RuntimeState,
    pub tool: &'a ToolDecl,
    /// State of the currently active step, if any.
    pub step_state: Option<&'a StepState>,
}

impl ToolContext<'_> {
    pub fn config(&self) -> Option<&serde_json::Value> {
        self.tool.config.as_ref()
    }
}

impl MissionRuntime {
    pub fn new(definition: ValidatedDefinition, run_id: RunId) -> Self {
        let state = RuntimeState::new(&definition, run_id);
        Self {
            definition,
            registry: None,
            state,
        }
    }

    /// Resume a persisted run. The caller vouches that `state` was produced
    /// from this definition.
    pub fn from_state(definition: ValidatedDefinition, state: RuntimeState) -> Self {
        Self {
            definition,
            registry: None,
            state,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn dispatch(&mut self, action: Action) -> Projection {
        let ctx = ReduceContext {
            definition: &self.definition,
            registry: self.registry.as_deref(),
        };
        apply(&mut self.state, ctx, action);
        project(&self.state)
    }

    pub fn start_mission(&mut self) -> Projection {
        self.dispatch(Action::Start)
    }

    pub fn pause_mission(&mut self) -> Projection {
        self.dispatch(Action::Pause)
    }

    pub fn resume_mission(&mut self) -> Projection {
        self.dispatch(Action::Resume)
    }

    pub fn complete_current_step(&mut self) -> Projection {
        self.dispatch(Action::CompleteCurrentStep)
    }

    pub fn skip_current_step(&mut self) -> Projection {
        self.dispatch(Action::SkipCurrentStep)
    }

    pub fn complete_mission(&mut self) -> Projection {
        self.dispatch(Action::CompleteMission)
    }

    pub fn abort_mission(&mut self, reason: impl Into<String>) -> Projection {
        self.dispatch(Action::Abort {
            reason: reason.into(),
        })
    }

    pub fn open_tool(&mut self, tool_id: ToolId) -> Projection {
        self.dispatch(Action::OpenTool { tool_id })
    }

    pub fn set_active_tool(&mut self, tool_id: ToolId) -> Projection {
        self.dispatch(Action::SetActiveTool { tool_id })
    }

    pub fn close_tool(&mut self, tool_id: ToolId) -> Projection {
        self.dispatch(Action::CloseTool { tool_id })
    }

    pub fn ack_checkpoint(&mut self, checkpoint_id: CheckpointId) -> Projection {
        self.dispatch(Action::AckCheckpoint { checkpoint_id })
    }

    pub fn dispatch_tool_event(&mut self, tool_id: ToolId, name: impl Into<String>) -> Projection {
        self.dispatch(Action::ToolEvent {
            tool_id,
            name: name.into(),
        })
    }

    /// Advance mission time. Sub-millisecond remainders are dropped.
    pub fn tick(&mut self, delta: Duration) -> Projection {
        let delta_ms = u64::try_from(delta.as_millis()).unwrap_or(u64::MAX);
        self.dispatch(Action::Tick { delta_ms })
    }

    pub fn projection(&self) -> Projection {
        project(&self.state)
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn definition(&self) -> &ValidatedDefinition {
        &self.definition
    }

    pub fn registry(&self) -> Option<&Registry> {
        self.registry.as_deref()
    }

    pub fn run_id(&self) -> &RunId {
        &self.state.run_id
    }

    pub fn event_log(&self) -> &[LogEntry] {
        &self.state.event_log
    }

    pub fn last_entry(&self) -> Option<&LogEntry> {
        self.state.event_log.last()
    }

    /// Context for the panel rendering `tool_id`; `None` if the tool is not declared.
    pub fn tool_context(&self, tool_id: &ToolId) -> Option<ToolContext<'_>> {
        let tool = self.definition.tool(tool_id)?;
        Some(ToolContext {
            run_id: &self.state.run_id,
            definition: &self.definition,
            state: &self.state,
            tool,
            step_state: self.state.active_step(),
        })
    }

    /// Consume the runtime, keeping the state for persistence.
    pub fn into_state(self) -> RuntimeState {
        self.state
    }
}
