//! Tool and layout lookup tables.
//!
//! Built once at process start and never mutated. The runtime consults the
//! registry only to validate ids; rendering stays with the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{LayoutId, MissionDefinition, Placement, Rejection, ToolId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub id: ToolId,
    pub name: String,
    /// Placements the renderer supports. Empty means any.
    #[serde(default)]
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDescriptor {
    pub id: LayoutId,
    pub name: String,
    #[serde(default)]
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    tools: BTreeMap<ToolId, ToolDescriptor>,
    layouts: BTreeMap<LayoutId, LayoutDescriptor>,
}

impl Registry {
    pub fn new(
        tools: impl IntoIterator<Item = ToolDescriptor>,
        layouts: impl IntoIterator<Item = LayoutDescriptor>,
    ) -> Self {
        Self {
            tools: tools.into_iter().map(|tool| (tool.id.clone(), tool)).collect(),
            layouts: layouts
                .into_iter()
                .map(|layout| (layout.id.clone(), layout))
                .collect(),
        }
    }

    pub fn get_tool(&self, id: &ToolId) -> Option<&ToolDescriptor> {
        self.tools.get(id)
    }

    pub fn get_layout(&self, id: &LayoutId) -> Option<&LayoutDescriptor> {
        self.layouts.get(id)
    }

    pub fn tools(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values()
    }

    pub fn layouts(&self) -> impl Iterator<Item = &LayoutDescriptor> {
        self.layouts.values()
    }

    /// Every layout or tool id the definition references that this registry
    /// cannot resolve, in declaration order (layout first).
    pub fn check(&self, definition: &MissionDefinition) -> Vec<Rejection> {
        let mut issues = Vec::new();
        if self.get_layout(&definition.layout).is_none() {
            issues.push(Rejection::UnknownLayoutId {
                layout_id: definition.layout.clone(),
            });
        }
        for tool in &definition.tools {
            if self.get_tool(&tool.tool_id).is_none() {
                issues.push(Rejection::UnknownToolId {
                    tool_id: tool.tool_id.clone(),
                });
            }
        }
        issues
    }

    /// True when the descriptor allows the placement the definition asks for.
    pub fn supports_placement(&self, id: &ToolId, placement: Placement) -> bool {
        self.get_tool(id).is_some_and(|tool| {
            tool.placements.is_empty() || tool.placements.contains(&placement)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_definition, base_registry};

    #[test]
    fn lookups_resolve_registered_ids() {
        let registry = base_registry();
        assert!(registry.get_tool(&ToolId("notes".to_string())).is_some());
        assert!(registry.get_tool(&ToolId("undeclared.tool".to_string())).is_none());
        assert!(registry
            .get_layout(&LayoutId("layout.focus".to_string()))
            .is_some());
    }

    #[test]
    fn check_passes_for_fully_registered_definition() {
        assert!(base_registry().check(&base_definition()).is_empty());
    }

    #[test]
    fn check_reports_missing_layout_and_tools() {
        let registry = Registry::new(
            vec![ToolDescriptor {
                id: ToolId("notes".to_string()),
                name: "Notes".to_string(),
                placements: vec![],
            }],
            vec![],
        );
        let issues = registry.check(&base_definition());
        assert!(matches!(issues[0], Rejection::UnknownLayoutId { .. }));
        let missing: Vec<&str> = issues
            .iter()
            .filter_map(|issue| match issue {
                Rejection::UnknownToolId { tool_id } => Some(tool_id.as_str()),
                _ => None,
            })
            .collect();
        assert!(missing.contains(&"quiz"));
        assert!(!missing.contains(&"notes"));
    }

    #[test]
    fn placement_support_defaults_to_any() {
        let registry = base_registry();
        assert!(registry.supports_placement(&ToolId("notes".to_string()), Placement::Overlay));
        assert!(!registry.supports_placement(&ToolId("quiz".to_string()), Placement::Dock));
    }
}
