// ABOUTME: Tool trait and registry for model function calling, with schemas expressed as serde_json::Value.
// ABOUTME: The registry turns a model's toolUse block into the toolResult block sent back on the next turn.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use playbook_core::{ToolResult, ToolSpec, ToolUse};

/// What a tool hands back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub content: Value,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn json(content: Value) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: Value::String(message.into()),
            is_error: true,
        }
    }
}

/// A callable exposed to an agent.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the input object.
    fn schema(&self) -> Value;

    async fn execute(&self, params: Value) -> Result<ToolOutput, anyhow::Error>;

    /// Provider-agnostic description sent with each request.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.schema(),
        }
    }
}

/// Tools available to one agent, keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a later tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Specs for every registered tool, in name order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.spec()).collect()
    }

    /// Execute a model-requested tool call. Unknown tools and tool failures
    /// become error results so the model can see what went wrong.
    pub async fn execute(&self, tool_use: &ToolUse) -> ToolResult {
        let Some(tool) = self.tools.get(&tool_use.name) else {
            tracing::warn!(tool = %tool_use.name, "model requested unknown tool");
            return ToolResult::error(
                &tool_use.tool_use_id,
                format!("unknown tool: {}", tool_use.name),
            );
        };

        match tool.execute(tool_use.input.clone()).await {
            Ok(output) if output.is_error => {
                let message = match output.content {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                ToolResult::error(&tool_use.tool_use_id, message)
            }
            Ok(output) => ToolResult::json(&tool_use.tool_use_id, output.content),
            Err(e) => {
                tracing::warn!(tool = %tool_use.name, error = %e, "tool execution failed");
                ToolResult::error(&tool_use.tool_use_id, format!("tool failed: {}", e))
            }
        }
    }
}

impl FromIterator<Arc<dyn Tool>> for ToolRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Tool>>>(iter: I) -> Self {
        let mut registry = Self::new();
        for tool in iter {
            registry.register(tool);
        }
        registry
    }
}
