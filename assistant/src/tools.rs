//! Closed tool registry.
//!
//! Tools are variants of [`ToolId`], not strings looked up at call time. The
//! registry is checked once when built; afterwards an unknown name from the
//! model has exactly one failure path, [`OrchestratorError::UnknownTool`].

use std::collections::HashSet;

use ai_llm_service::chat::ToolSpec;
use chart_tool::tool::{self as chart, ToolResult, VisualizationArgs};
use serde_json::Value;
use tracing::warn;

use crate::error::{AssistantConfigError, OrchestratorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    CsvVisualization,
}

impl ToolId {
    pub const ALL: [ToolId; 1] = [ToolId::CsvVisualization];

    pub fn name(self) -> &'static str {
        match self {
            ToolId::CsvVisualization => chart::TOOL_NAME,
        }
    }

    pub fn spec(self) -> ToolSpec {
        match self {
            ToolId::CsvVisualization => ToolSpec {
                name: chart::TOOL_NAME.to_string(),
                description: chart::TOOL_DESCRIPTION.to_string(),
                parameters: chart::parameters_schema(),
            },
        }
    }

    /// Runs the tool. Bad arguments come back as error text for the model.
    pub fn invoke(self, arguments: &Value) -> ToolResult {
        match self {
            ToolId::CsvVisualization => match VisualizationArgs::from_value(arguments) {
                Ok(args) => chart::create_csv_visualization(&args),
                Err(e) => {
                    warn!(tool = self.name(), error = %e, "invalid tool arguments");
                    ToolResult {
                        description: format!("Error: invalid arguments for {}: {e}", self.name()),
                        artifact: None,
                    }
                }
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolId>,
}

impl ToolRegistry {
    /// # Errors
    /// Fails when two tools share a name.
    pub fn new(tools: Vec<ToolId>) -> Result<Self, AssistantConfigError> {
        let mut seen = HashSet::new();
        for t in &tools {
            if !seen.insert(t.name()) {
                return Err(AssistantConfigError::DuplicateTool(t.name()));
            }
        }
        Ok(Self { tools })
    }

    /// An empty registry: the model is offered no tools.
    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn catalog(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn resolve(&self, name: &str) -> Result<ToolId, OrchestratorError> {
        self.tools
            .iter()
            .copied()
            .find(|t| t.name() == name)
            .ok_or_else(|| OrchestratorError::UnknownTool(name.to_string()))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self {
            tools: ToolId::ALL.to_vec(),
        }
    }
}
