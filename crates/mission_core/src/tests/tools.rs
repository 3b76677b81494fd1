use super::*;
use std::sync::Arc;

#[test]
fn opening_undeclared_tool_is_rejected_and_logged() {
    let mut runtime = started(base_definition());
    let before = runtime.state().open_tool_ids.clone();

    runtime.open_tool(tool("undeclared.tool"));
    assert_eq!(runtime.state().open_tool_ids, before);
    assert_eq!(
        last_rejection(&runtime),
        Some(Rejection::UnknownToolId {
            tool_id: tool("undeclared.tool")
        })
    );
    assert_eq!(
        runtime.last_entry().unwrap().outcome.tag(),
        "rejected:unknownToolId"
    );
}

#[test]
fn open_tool_adds_and_focuses() {
    let mut runtime = started(base_definition());
    let projection = runtime.open_tool(tool("quiz"));
    assert_eq!(projection.open_tool_ids, vec![tool("notes"), tool("quiz")]);
    assert_eq!(projection.active_tool_id, Some(tool("quiz")));
}

#[test]
fn reopening_open_tool_only_refocuses() {
    let mut runtime = started(base_definition());
    runtime.open_tool(tool("quiz"));
    runtime.open_tool(tool("timer"));
    let projection = runtime.open_tool(tool("quiz"));
    assert_eq!(
        projection.open_tool_ids,
        vec![tool("notes"), tool("quiz"), tool("timer")]
    );
    assert_eq!(projection.active_tool_id, Some(tool("quiz")));
}

#[test]
fn set_active_tool_requires_open_tool() {
    let mut runtime = started(base_definition());
    runtime.set_active_tool(tool("quiz"));
    assert_eq!(
        last_rejection(&runtime),
        Some(Rejection::ToolNotOpen {
            tool_id: tool("quiz")
        })
    );

    let projection = runtime.set_active_tool(tool("notes"));
    assert_eq!(projection.active_tool_id, Some(tool("notes")));
}

#[test]
fn closing_active_tool_clears_focus_without_promotion() {
    let mut runtime = started(base_definition());
    runtime.open_tool(tool("quiz"));
    let projection = runtime.close_tool(tool("quiz"));
    assert_eq!(projection.open_tool_ids, vec![tool("notes")]);
    assert_eq!(projection.active_tool_id, None);
    assert!(runtime.last_entry().unwrap().effects.contains(&MissionEvent::ToolClosed {
        tool_id: tool("quiz"),
        was_active: true,
    }));
}

#[test]
fn closing_unfocused_tool_keeps_focus() {
    let mut runtime = started(base_definition());
    runtime.open_tool(tool("quiz"));
    let projection = runtime.close_tool(tool("notes"));
    assert_eq!(projection.active_tool_id, Some(tool("quiz")));
}

#[test]
fn closing_closed_tool_is_rejected() {
    let mut runtime = started(base_definition());
    runtime.close_tool(tool("timer"));
    assert!(matches!(
        last_rejection(&runtime),
        Some(Rejection::ToolNotOpen { .. })
    ));
}

#[test]
fn tools_can_open_during_briefing_before_start() {
    let mut runtime = runtime_for(base_definition());
    let projection = runtime.open_tool(tool("timer"));
    assert_eq!(projection.active_tool_id, Some(tool("timer")));
}

#[test]
fn registry_must_know_tool_when_attached() {
    let mut definition = base_definition();
    definition.tools.push(ToolDecl {
        tool_id: tool("whiteboard"),
        required: false,
        placement: Placement::Main,
        config: None,
    });
    let mut runtime = runtime_for(definition).with_registry(Arc::new(base_registry()));
    runtime.start_mission();

    runtime.open_tool(tool("whiteboard"));
    assert!(matches!(
        last_rejection(&runtime),
        Some(Rejection::UnknownToolId { .. })
    ));
    runtime.open_tool(tool("quiz"));
    assert!(runtime.last_entry().unwrap().outcome.is_applied());
}

#[test]
fn tool_context_exposes_config_and_active_step() {
    let mut definition = base_definition();
    definition.tools[1].config = Some(serde_json::json!({ "questions": 5 }));
    let runtime = started(definition);

    let context = runtime.tool_context(&tool("quiz")).unwrap();
    assert_eq!(context.run_id.as_str(), "run_test");
    assert_eq!(context.config().unwrap()["questions"], 5);
    assert_eq!(context.step_state.map(|s| s.status), Some(StepStatus::Active));
    assert!(runtime.tool_context(&tool("undeclared.tool")).is_none());
}
