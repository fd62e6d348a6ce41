//! The tool catalog as surfaced by the capability backend.

use serde::{Deserialize, Serialize};
use waypoint_llm::ToolDefinition;

/// One entry of `list_tools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within the catalog.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON schema for the tool's input object.
    pub parameters: serde_json::Value,
}

impl ToolDescriptor {
    /// Build a descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Convert to the Provider Adapter's tool definition shape.
    #[must_use]
    pub fn to_llm_tool(&self) -> ToolDefinition {
        ToolDefinition::new(&self.name, &self.description, self.parameters.clone())
    }
}

/// Format requested from `list_tools`; the backend is free to ignore this
/// and always return the canonical shape, but some arcade-style backends
/// branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    /// The canonical `{name, description, parameters}` shape.
    Default,
}

/// The cached tool catalog for one task. Read-only after
/// `Planner::initial` populates it, per the State invariants.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    descriptors: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Build a catalog from backend-provided descriptors.
    #[must_use]
    pub fn new(descriptors: Vec<ToolDescriptor>) -> Self {
        Self { descriptors }
    }

    /// All descriptors, in backend-provided order.
    #[must_use]
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// True when no external tools are available (meta-tools are always
    /// available regardless of catalog contents).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Convert to the set of tool definitions offered to the model,
    /// including the three meta-tools.
    #[must_use]
    pub fn to_llm_tools(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<ToolDefinition> = self.descriptors.iter().map(ToolDescriptor::to_llm_tool).collect();
        tools.extend(crate::meta::meta_tool_definitions());
        tools
    }
}
