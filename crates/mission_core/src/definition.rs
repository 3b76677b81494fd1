//! Definition validation and lookup.
//!
//! A `MissionDefinition` becomes usable only through [`MissionDefinition::validate`],
//! which returns a [`ValidatedDefinition`]. The validated form is cheap to
//! clone and carries the fact that validation already ran.

use std::collections::HashSet;
use std::ops::Deref;
use std::sync::Arc;

use crate::{
    CheckpointDef, CheckpointId, Completion, DefinitionError, MissionDefinition, Step, StepId,
    ToolDecl, ToolId,
};

impl MissionDefinition {
    /// Checks structural invariants: at least one step, unique step/tool/checkpoint
    /// ids, every tool reference resolving to a declared tool, and tool-event
    /// completions needing at least one event.
    pub fn validate(self) -> Result<ValidatedDefinition, DefinitionError> {
        if self.steps.is_empty() {
            return Err(DefinitionError::EmptySteps);
        }

        let mut tool_ids: HashSet<&ToolId> = HashSet::new();
        for tool in &self.tools {
            if !tool_ids.insert(&tool.tool_id) {
                return Err(DefinitionError::DuplicateToolId(tool.tool_id.clone()));
            }
        }

        let mut step_ids: HashSet<&StepId> = HashSet::new();
        for step in &self.steps {
            if !step_ids.insert(&step.id) {
                return Err(DefinitionError::DuplicateStepId(step.id.clone()));
            }
            if let Some(primary) = &step.primary_tool_id {
                if !tool_ids.contains(primary) {
                    return Err(DefinitionError::UnknownPrimaryTool {
                        step: step.id.clone(),
                        tool: primary.clone(),
                    });
                }
            }
            if let Completion::ToolEvent { tool_id, count, .. } = &step.completion {
                if !tool_ids.contains(tool_id) {
                    return Err(DefinitionError::UnknownCompletionTool {
                        step: step.id.clone(),
                        tool: tool_id.clone(),
                    });
                }
                if *count == 0 {
                    return Err(DefinitionError::ZeroEventCount {
                        step: step.id.clone(),
                    });
                }
            }
        }

        let mut checkpoint_ids: HashSet<&CheckpointId> = HashSet::new();
        for checkpoint in &self.checkpoints {
            if !checkpoint_ids.insert(&checkpoint.id) {
                return Err(DefinitionError::DuplicateCheckpointId(
                    checkpoint.id.clone(),
                ));
            }
        }

        Ok(ValidatedDefinition(Arc::new(self)))
    }

    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == *id)
    }

    pub fn tool(&self, id: &ToolId) -> Option<&ToolDecl> {
        self.tools.iter().find(|tool| tool.tool_id == *id)
    }

    pub fn checkpoint(&self, id: &CheckpointId) -> Option<&CheckpointDef> {
        self.checkpoints.iter().find(|checkpoint| checkpoint.id == *id)
    }

    pub fn declares_tool(&self, id: &ToolId) -> bool {
        self.tool(id).is_some()
    }
}

/// A definition that passed [`MissionDefinition::validate`]. Immutable and shared.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDefinition(Arc<MissionDefinition>);

impl ValidatedDefinition {
    pub fn definition(&self) -> &MissionDefinition {
        &self.0
    }
}

impl Deref for ValidatedDefinition {
    type Target = MissionDefinition;

    fn deref(&self) -> &MissionDefinition {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_definition;
    use crate::Placement;

    #[test]
    fn base_definition_is_valid() {
        let definition = base_definition().validate().unwrap();
        assert_eq!(definition.steps.len(), 3);
    }

    #[test]
    fn empty_steps_rejected() {
        let mut definition = base_definition();
        definition.steps.clear();
        assert_eq!(definition.validate(), Err(DefinitionError::EmptySteps));
    }

    #[test]
    fn duplicate_step_id_rejected() {
        let mut definition = base_definition();
        let duplicate = definition.steps[0].clone();
        definition.steps.push(duplicate);
        assert_eq!(
            definition.validate(),
            Err(DefinitionError::DuplicateStepId(StepId("a".to_string())))
        );
    }

    #[test]
    fn duplicate_tool_id_rejected() {
        let mut definition = base_definition();
        definition.tools.push(ToolDecl {
            tool_id: ToolId("notes".to_string()),
            required: false,
            placement: Placement::Dock,
            config: None,
        });
        assert_eq!(
            definition.validate(),
            Err(DefinitionError::DuplicateToolId(ToolId("notes".to_string())))
        );
    }

    #[test]
    fn dangling_primary_tool_rejected() {
        let mut definition = base_definition();
        definition.steps[1].primary_tool_id = Some(ToolId("whiteboard".to_string()));
        assert!(matches!(
            definition.validate(),
            Err(DefinitionError::UnknownPrimaryTool { step, tool })
                if step.as_str() == "b" && tool.as_str() == "whiteboard"
        ));
    }

    #[test]
    fn dangling_completion_tool_rejected() {
        let mut definition = base_definition();
        definition.steps[2].completion = Completion::ToolEvent {
            tool_id: ToolId("whiteboard".to_string()),
            name: "drawn".to_string(),
            count: 1,
        };
        assert!(matches!(
            definition.validate(),
            Err(DefinitionError::UnknownCompletionTool { .. })
        ));
    }

    #[test]
    fn zero_event_count_rejected() {
        let definition = crate::test_fixtures::tool_event_definition(0);
        assert!(matches!(
            definition.validate(),
            Err(DefinitionError::ZeroEventCount { step }) if step.as_str() == "a"
        ));
    }

    #[test]
    fn duplicate_checkpoint_rejected() {
        let mut definition = crate::test_fixtures::checkpoint_definition(30);
        let duplicate = definition.checkpoints[0].clone();
        definition.checkpoints.push(duplicate);
        assert!(matches!(
            definition.validate(),
            Err(DefinitionError::DuplicateCheckpointId(_))
        ));
    }

    #[test]
    fn lookups_find_declared_entries() {
        let definition = base_definition().validate().unwrap();
        assert!(definition.declares_tool(&ToolId("notes".to_string())));
        assert!(!definition.declares_tool(&ToolId("undeclared.tool".to_string())));
        assert_eq!(
            definition.step(&StepId("b".to_string())).map(|s| s.title.as_str()),
            Some("Step B")
        );
    }
}
