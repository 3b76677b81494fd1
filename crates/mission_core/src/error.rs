use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CheckpointId, LayoutId, LogEntry, MissionStatus, StepId, ToolId};

/// A definition that cannot back a runtime. Raised once, at load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("mission defines no steps")]
    EmptySteps,
    #[error("step id '{0}' is declared more than once")]
    DuplicateStepId(StepId),
    #[error("tool id '{0}' is declared more than once")]
    DuplicateToolId(ToolId),
    #[error("checkpoint id '{0}' is declared more than once")]
    DuplicateCheckpointId(CheckpointId),
    #[error("step '{step}' names primary tool '{tool}' which is not declared")]
    UnknownPrimaryTool { step: StepId, tool: ToolId },
    #[error("step '{step}' completes on events from tool '{tool}' which is not declared")]
    UnknownCompletionTool { step: StepId, tool: ToolId },
    #[error("step '{step}' completes after zero tool events")]
    ZeroEventCount { step: StepId },
}

/// Why a dispatched action was refused. Recorded in the event log, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum Rejection {
    #[error("mission is {status} and accepts no further actions")]
    TerminalState { status: MissionStatus },
    #[error("checkpoint '{requested}' is not the open checkpoint ({open:?})")]
    #[serde(rename_all = "camelCase")]
    CheckpointMismatch {
        open: Option<CheckpointId>,
        requested: CheckpointId,
    },
    #[error("unknown tool id '{tool_id}'")]
    #[serde(rename_all = "camelCase")]
    UnknownToolId { tool_id: ToolId },
    #[error("unknown layout id '{layout_id}'")]
    #[serde(rename_all = "camelCase")]
    UnknownLayoutId { layout_id: LayoutId },
    #[error("no step is active")]
    StepNotActive,
    #[error("tool '{tool_id}' is not open")]
    #[serde(rename_all = "camelCase")]
    ToolNotOpen { tool_id: ToolId },
    #[error("{action} is not legal while the mission is {status}")]
    IllegalTransition {
        action: String,
        status: MissionStatus,
    },
    #[error("mission is {status}; step and tool state is frozen")]
    MissionNotActive { status: MissionStatus },
    #[error("checkpoint '{checkpoint_id}' must be acknowledged first")]
    #[serde(rename_all = "camelCase")]
    CheckpointOpen { checkpoint_id: CheckpointId },
}

impl Rejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TerminalState { .. } => "terminalState",
            Self::CheckpointMismatch { .. } => "checkpointMismatch",
            Self::UnknownToolId { .. } => "unknownToolId",
            Self::UnknownLayoutId { .. } => "unknownLayoutId",
            Self::StepNotActive => "stepNotActive",
            Self::ToolNotOpen { .. } => "toolNotOpen",
            Self::IllegalTransition { .. } => "illegalTransition",
            Self::MissionNotActive { .. } => "missionNotActive",
            Self::CheckpointOpen { .. } => "checkpointOpen",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("log entry at position {index} carries seq {found}")]
    SequenceGap { index: u64, found: u64 },
    #[error("replay diverged at seq {seq}: recorded {recorded}, replayed {replayed}")]
    Diverged {
        seq: u64,
        recorded: String,
        replayed: String,
    },
    #[error("replayed state differs from the live state")]
    StateMismatch,
}

impl ReplayError {
    pub(crate) fn diverged(recorded: &LogEntry, replayed: &LogEntry) -> Self {
        let summary = |entry: &LogEntry| {
            format!("{} ({} effects)", entry.outcome.tag(), entry.effects.len())
        };
        Self::Diverged {
            seq: recorded.seq,
            recorded: summary(recorded),
            replayed: summary(replayed),
        }
    }
}
