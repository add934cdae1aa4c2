pub mod clock;
pub mod greeting;
pub mod traits;
pub mod weather;

pub use clock::{get_current_time, get_current_time_at, CurrentTimeTool};
pub use greeting::{say_goodbye, say_hello, GoodbyeTool, HelloTool};
pub use traits::{Tool, ToolDefinition};
pub use weather::{get_weather, WeatherTool};

use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::types::{ToolCall, ToolOutcome, ToolResult, ToolValue};

/// Name of the built-in tool a coordinator calls to hand off to a sub-agent.
pub const TRANSFER_TOOL: &str = "transfer_to_agent";

// ---------------------------------------------------------------------------
// Tool sets
// ---------------------------------------------------------------------------

/// The ordered set of tools one agent is permitted to use.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Duplicate names are caught when the owning agent is built.
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Definitions exposed to the decision engine.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Execute one tool call.
    ///
    /// Unknown tools and undecodable arguments come back as error results so
    /// the decision engine can react to them; nothing here aborts the turn.
    pub async fn execute(&self, call: &ToolCall) -> ToolOutcome {
        let value = match self.get(&call.name) {
            Some(tool) => match tool.execute(&call.arguments).await {
                Ok(value) => value,
                Err(e) => {
                    warn!("Tool '{}' rejected arguments {}: {:#}", call.name, call.arguments, e);
                    ToolValue::Structured(ToolResult::error(format!("Error: {:#}", e)))
                }
            },
            None => {
                warn!("Unknown tool requested: {}", call.name);
                ToolValue::Structured(ToolResult::error(format!(
                    "Unknown tool: {}",
                    call.name
                )))
            }
        };

        ToolOutcome {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            value,
        }
    }
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in delegation tool
// ---------------------------------------------------------------------------

/// Definition of the transfer tool offered to agents that have sub-agents.
pub fn transfer_definition(targets: &[&str]) -> ToolDefinition {
    ToolDefinition {
        name: TRANSFER_TOOL.into(),
        description: "Transfer the question to another agent. Use this when another \
                      agent's description says it handles the user's request."
            .into(),
        parameters: json!({
            "type": "object",
            "properties": {
                "agent_name": {
                    "type": "string",
                    "description": "The name of the agent to transfer to",
                    "enum": targets
                }
            },
            "required": ["agent_name"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_tools() -> ToolSet {
        ToolSet::new().with(WeatherTool).with(CurrentTimeTool)
    }

    #[test]
    fn test_toolset_lookup() {
        let set = team_tools();
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["get_weather", "get_current_time"]);
        assert!(set.contains("get_weather"));
        assert!(!set.contains("say_hello"));
        assert!(ToolSet::new().is_empty());
    }

    #[test]
    fn test_definitions_carry_metadata() {
        let defs = ToolSet::new().with(WeatherTool).with(HelloTool).definitions();
        assert_eq!(defs[0].name, "get_weather");
        assert!(defs[0].description.contains("status"));
        assert_eq!(defs[0].parameters["required"], json!(["city"]));
        assert!(defs[0].parameters["properties"]["city"]["description"].is_string());
        assert_eq!(defs[1].name, "say_hello");
        assert!(defs[1].parameters.get("required").is_none());
    }

    #[tokio::test]
    async fn test_execute_known_tool() {
        let call = ToolCall::new("get_weather", json!({"city": "new york"}));
        let outcome = team_tools().execute(&call).await;
        assert_eq!(outcome.tool_call_id, call.id);
        assert_eq!(outcome.name, "get_weather");
        assert!(outcome.success());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_is_error_value() {
        let call = ToolCall::new("launch_rocket", json!({}));
        let outcome = team_tools().execute(&call).await;
        assert!(!outcome.success());
        assert_eq!(outcome.value.text(), "Unknown tool: launch_rocket");
    }

    #[tokio::test]
    async fn test_execute_bad_arguments_is_error_value() {
        let call = ToolCall::new("get_weather", json!({"town": "Paris"}));
        let outcome = team_tools().execute(&call).await;
        assert!(!outcome.success());
        assert!(outcome.value.text().starts_with("Error:"));
    }

    #[test]
    fn test_transfer_definition_lists_targets() {
        let def = transfer_definition(&["greeting_agent", "farewell_agent"]);
        assert_eq!(def.name, TRANSFER_TOOL);
        assert_eq!(
            def.parameters["properties"]["agent_name"]["enum"],
            json!(["greeting_agent", "farewell_agent"])
        );
    }
}
