//! Greeting and farewell tools. Neither has an error path.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::Tool;
use crate::types::ToolValue;

/// Name used when the caller does not supply one.
pub const DEFAULT_GREETING_NAME: &str = "there";

/// Provide a simple greeting, optionally addressing the user by name.
pub fn say_hello(name: Option<&str>) -> String {
    let name = name.unwrap_or(DEFAULT_GREETING_NAME);
    info!("--- Tool: say_hello called with name: {} ---", name);
    format!("Hello, {}!", name)
}

/// Provide a simple farewell message to conclude the conversation.
pub fn say_goodbye() -> String {
    info!("--- Tool: say_goodbye called ---");
    "Goodbye! Have a great day.".to_string()
}

#[derive(Debug, Default, Deserialize)]
struct HelloArgs {
    #[serde(default)]
    name: Option<String>,
}

pub struct HelloTool;

#[async_trait]
impl Tool for HelloTool {
    fn name(&self) -> &str {
        "say_hello"
    }

    fn description(&self) -> &str {
        "Provides a simple greeting, optionally addressing the user by name. \
         Returns a friendly greeting message as a string."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "The name of the person to greet. Defaults to \"there\"."
                }
            }
        })
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<ToolValue> {
        let args: HelloArgs = if args.is_null() {
            HelloArgs::default()
        } else {
            serde_json::from_value(args.clone()).context("Invalid 'name' argument")?
        };
        Ok(say_hello(args.name.as_deref()).into())
    }
}

pub struct GoodbyeTool;

#[async_trait]
impl Tool for GoodbyeTool {
    fn name(&self) -> &str {
        "say_goodbye"
    }

    fn description(&self) -> &str {
        "Provides a simple farewell message to conclude the conversation. \
         Returns the farewell message as a string."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: &serde_json::Value) -> Result<ToolValue> {
        Ok(say_goodbye().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_contains_name() {
        for name in ["Alice", "Bob Smith", "", "Zoë"] {
            assert!(say_hello(Some(name)).contains(name));
        }
        assert_eq!(say_hello(Some("Alice")), "Hello, Alice!");
    }

    #[test]
    fn test_hello_default_placeholder() {
        assert_eq!(say_hello(None), "Hello, there!");
    }

    #[test]
    fn test_goodbye_is_stable() {
        let first = say_goodbye();
        assert_eq!(first, "Goodbye! Have a great day.");
        for _ in 0..5 {
            assert_eq!(say_goodbye(), first);
        }
    }

    #[tokio::test]
    async fn test_hello_tool_arguments() {
        let named = HelloTool.execute(&json!({"name": "Ada"})).await.unwrap();
        assert_eq!(named.text(), "Hello, Ada!");

        let unnamed = HelloTool.execute(&json!({})).await.unwrap();
        assert_eq!(unnamed.text(), "Hello, there!");

        let null = HelloTool.execute(&serde_json::Value::Null).await.unwrap();
        assert_eq!(null.text(), "Hello, there!");

        assert!(HelloTool.execute(&json!({"name": 42})).await.is_err());
    }

    #[tokio::test]
    async fn test_goodbye_tool_ignores_arguments() {
        let value = GoodbyeTool.execute(&json!({"unexpected": true})).await.unwrap();
        assert_eq!(value, ToolValue::Text("Goodbye! Have a great day.".into()));
    }
}
