//! Type definitions for `mission_core`.
//!
//! Definitions are static and loaded once per run; `RuntimeState` is the only
//! mutable type and is changed exclusively by the reducer in `engine`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Rejection;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(MissionId);
string_id!(StepId);
string_id!(ToolId);
string_id!(LayoutId);
string_id!(CheckpointId);
string_id!(RunId);

// ---------------------------------------------------------------------------
// Definition types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissionMode {
    Solo,
    /// Multi-party; only informs renderers.
    Pod,
}

/// Where a tool panel may be opened. Interpreted by the layout renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement {
    Main,
    Sidebar,
    Overlay,
    Dock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDecl {
    pub tool_id: ToolId,
    /// Required tools are opened when the mission starts.
    #[serde(default)]
    pub required: bool,
    pub placement: Placement,
    /// Opaque panel configuration, handed to the panel untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    Briefing,
    Task,
    Review,
    Break,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Completion {
    /// Completed only by an explicit `CompleteCurrentStep`.
    Manual,
    #[serde(rename_all = "camelCase")]
    Time {
        seconds: u64,
        /// When false the step is flagged ready and waits for confirmation.
        #[serde(default)]
        auto_advance: bool,
    },
    #[serde(rename_all = "camelCase")]
    ToolEvent {
        tool_id: ToolId,
        name: String,
        count: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_tool_id: Option<ToolId>,
    pub completion: Completion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CheckpointTrigger {
    #[serde(rename_all = "camelCase")]
    Time { seconds_from_start: u64 },
}

impl CheckpointTrigger {
    pub fn threshold_ms(self) -> u64 {
        match self {
            Self::Time { seconds_from_start } => seconds_from_start.saturating_mul(1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointDef {
    pub id: CheckpointId,
    pub title: String,
    pub trigger: CheckpointTrigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDefinition {
    pub id: MissionId,
    pub version: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub mode: MissionMode,
    pub layout: LayoutId,
    #[serde(default)]
    pub tools: Vec<ToolDecl>,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub checkpoints: Vec<CheckpointDef>,
    #[serde(default, rename = "rewardXP")]
    pub reward_xp: u32,
    #[serde(default)]
    pub estimated_duration_minutes: u32,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissionStatus {
    Idle,
    Active,
    Paused,
    Completed,
    Aborted,
}

impl MissionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Briefing,
    Running,
    Checkpoint,
    Debrief,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Briefing => "briefing",
            Self::Running => "running",
            Self::Checkpoint => "checkpoint",
            Self::Debrief => "debrief",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepStatus {
    Locked,
    Available,
    Active,
    Completed,
    Skipped,
}

impl StepStatus {
    /// Completed or skipped.
    pub fn is_done(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Locked => "locked",
            Self::Available => "available",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    pub status: StepStatus,
    /// Time spent active, excluding pauses and open checkpoints.
    pub elapsed_ms: u64,
    /// A timed step reached its duration but waits for manual confirmation.
    pub ready: bool,
    pub event_counts: BTreeMap<String, u32>,
}

impl StepState {
    pub fn new(status: StepStatus) -> Self {
        Self {
            status,
            elapsed_ms: 0,
            ready: false,
            event_counts: BTreeMap::new(),
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_ms / 1000
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCheckpoint {
    pub id: CheckpointId,
    pub opened_at_ms: u64,
    /// Phase that was current when the checkpoint fired.
    pub interrupted_phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeState {
    pub run_id: RunId,
    pub status: MissionStatus,
    pub phase: Phase,
    pub step_order: Vec<StepId>,
    pub steps: BTreeMap<StepId, StepState>,
    pub active_step_id: Option<StepId>,
    /// Open tools in the order they were opened.
    pub open_tool_ids: Vec<ToolId>,
    pub active_tool_id: Option<ToolId>,
    pub checkpoint: Option<OpenCheckpoint>,
    pub fired_checkpoints: BTreeSet<CheckpointId>,
    /// Mission clock; advanced only by ticks.
    pub clock_ms: u64,
    pub started_at_ms: Option<u64>,
    pub paused_accum_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<String>,
    pub event_log: Vec<LogEntry>,
}

// ---------------------------------------------------------------------------
// Action types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Start,
    Pause,
    Resume,
    CompleteCurrentStep,
    SkipCurrentStep,
    CompleteMission,
    Abort {
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    OpenTool {
        tool_id: ToolId,
    },
    #[serde(rename_all = "camelCase")]
    SetActiveTool {
        tool_id: ToolId,
    },
    #[serde(rename_all = "camelCase")]
    CloseTool {
        tool_id: ToolId,
    },
    #[serde(rename_all = "camelCase")]
    AckCheckpoint {
        checkpoint_id: CheckpointId,
    },
    #[serde(rename_all = "camelCase")]
    ToolEvent {
        tool_id: ToolId,
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    Tick {
        delta_ms: u64,
    },
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::CompleteCurrentStep => "completeCurrentStep",
            Self::SkipCurrentStep => "skipCurrentStep",
            Self::CompleteMission => "completeMission",
            Self::Abort { .. } => "abort",
            Self::OpenTool { .. } => "openTool",
            Self::SetActiveTool { .. } => "setActiveTool",
            Self::CloseTool { .. } => "closeTool",
            Self::AckCheckpoint { .. } => "ackCheckpoint",
            Self::ToolEvent { .. } => "toolEvent",
            Self::Tick { .. } => "tick",
        }
    }
}

// ---------------------------------------------------------------------------
// Event log types
// ---------------------------------------------------------------------------

/// Derived consequence of an applied action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MissionEvent {
    StatusChanged {
        from: MissionStatus,
        to: MissionStatus,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    #[serde(rename_all = "camelCase")]
    StepStatusChanged {
        step_id: StepId,
        from: StepStatus,
        to: StepStatus,
    },
    #[serde(rename_all = "camelCase")]
    StepReady {
        step_id: StepId,
    },
    #[serde(rename_all = "camelCase")]
    ToolEventCounted {
        step_id: StepId,
        name: String,
        count: u32,
    },
    #[serde(rename_all = "camelCase")]
    CheckpointOpened {
        checkpoint_id: CheckpointId,
    },
    #[serde(rename_all = "camelCase")]
    CheckpointClosed {
        checkpoint_id: CheckpointId,
    },
    #[serde(rename_all = "camelCase")]
    ToolOpened {
        tool_id: ToolId,
    },
    #[serde(rename_all = "camelCase")]
    ToolFocused {
        tool_id: ToolId,
    },
    #[serde(rename_all = "camelCase")]
    ToolClosed {
        tool_id: ToolId,
        was_active: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outcome {
    Applied,
    Rejected { reason: Rejection },
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Applied => None,
            Self::Rejected { reason } => Some(reason),
        }
    }

    /// `applied` or `rejected:<reason>`.
    pub fn tag(&self) -> String {
        match self {
            Self::Applied => "applied".to_string(),
            Self::Rejected { reason } => format!("rejected:{}", reason.code()),
        }
    }
}

/// One entry per dispatched action, applied or rejected. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub seq: u64,
    pub at_ms: u64,
    pub action: Action,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<MissionEvent>,
}
