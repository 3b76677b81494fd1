//! Shared test fixtures for mission_core and downstream crates.
//!
//! `base_definition()` is three manual steps `a`, `b`, `c` with three declared
//! tools; the other builders tweak one aspect of it for focused scenarios.

use crate::{
    CheckpointDef, CheckpointId, CheckpointTrigger, Completion, LayoutDescriptor, LayoutId,
    MissionDefinition, MissionId, MissionMode, MissionRuntime, Placement, Registry, RunId, Step,
    StepId, StepKind, ToolDecl, ToolDescriptor, ToolId,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn manual_step(id: &str) -> Step {
    Step {
        id: StepId(id.to_string()),
        title: format!("Step {}", id.to_uppercase()),
        description: String::new(),
        kind: StepKind::Task,
        primary_tool_id: None,
        completion: Completion::Manual,
    }
}

fn tool(id: &str, required: bool, placement: Placement) -> ToolDecl {
    ToolDecl {
        tool_id: ToolId(id.to_string()),
        required,
        placement,
        config: None,
    }
}

/// Three manual steps, `notes` required, `quiz` and `timer` optional.
pub fn base_definition() -> MissionDefinition {
    MissionDefinition {
        id: MissionId("mission_test".to_string()),
        version: "1".to_string(),
        title: "Test Mission".to_string(),
        description: String::new(),
        mode: MissionMode::Solo,
        layout: LayoutId("layout.focus".to_string()),
        tools: vec![
            tool("notes", true, Placement::Sidebar),
            tool("quiz", false, Placement::Main),
            tool("timer", false, Placement::Overlay),
        ],
        steps: vec![manual_step("a"), manual_step("b"), manual_step("c")],
        checkpoints: vec![],
        reward_xp: 50,
        estimated_duration_minutes: 25,
    }
}

/// One timed step followed by a manual one.
pub fn timed_definition(seconds: u64, auto_advance: bool) -> MissionDefinition {
    let mut definition = base_definition();
    definition.steps = vec![
        Step {
            completion: Completion::Time {
                seconds,
                auto_advance,
            },
            ..manual_step("focus")
        },
        manual_step("wrap"),
    ];
    definition
}

/// Base steps plus a single checkpoint `cp_break`.
pub fn checkpoint_definition(seconds_from_start: u64) -> MissionDefinition {
    let mut definition = base_definition();
    definition.checkpoints = vec![CheckpointDef {
        id: CheckpointId("cp_break".to_string()),
        title: "Stretch break".to_string(),
        trigger: CheckpointTrigger::Time { seconds_from_start },
    }];
    definition
}

/// First step completes after `count` `quiz/submitted` events; quiz is its primary tool.
pub fn tool_event_definition(count: u32) -> MissionDefinition {
    let mut definition = base_definition();
    definition.steps[0] = Step {
        primary_tool_id: Some(ToolId("quiz".to_string())),
        completion: Completion::ToolEvent {
            tool_id: ToolId("quiz".to_string()),
            name: "submitted".to_string(),
            count,
        },
        ..manual_step("a")
    };
    definition
}

pub fn base_registry() -> Registry {
    Registry::new(
        vec![
            ToolDescriptor {
                id: ToolId("notes".to_string()),
                name: "Notes".to_string(),
                placements: vec![],
            },
            ToolDescriptor {
                id: ToolId("quiz".to_string()),
                name: "Quiz".to_string(),
                placements: vec![Placement::Main],
            },
            ToolDescriptor {
                id: ToolId("timer".to_string()),
                name: "Timer".to_string(),
                placements: vec![Placement::Overlay, Placement::Dock],
            },
        ],
        vec![LayoutDescriptor {
            id: LayoutId("layout.focus".to_string()),
            name: "Focus".to_string(),
            slots: vec!["main".to_string(), "sidebar".to_string()],
        }],
    )
}

pub fn test_run_id() -> RunId {
    RunId("run_test".to_string())
}

/// Validates `definition` and wraps it in a runtime with the fixed test run id.
pub fn runtime_for(definition: MissionDefinition) -> MissionRuntime {
    let validated = definition
        .validate()
        .expect("fixture definitions are valid");
    MissionRuntime::new(validated, test_run_id())
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
