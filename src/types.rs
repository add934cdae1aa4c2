//! Shared types used across the agent team runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Delegation boundary states
// ---------------------------------------------------------------------------

/// States a single conversational turn moves through inside the runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryState {
    /// Idle, waiting for the next user query.
    #[default]
    AwaitingQuery,
    /// The decision engine is choosing what the active agent does next.
    Classifying,
    /// Running one or more of the active agent's own tools.
    ExecutingLocalTool,
    /// Handing control to a sub-agent.
    DelegatingToSubAgent,
    /// Emitting the terminal event for the turn.
    Responding,
}

impl fmt::Display for BoundaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingQuery => write!(f, "awaiting_query"),
            Self::Classifying => write!(f, "classifying"),
            Self::ExecutingLocalTool => write!(f, "executing_local_tool"),
            Self::DelegatingToSubAgent => write!(f, "delegating_to_sub_agent"),
            Self::Responding => write!(f, "responding"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tool results
// ---------------------------------------------------------------------------

/// Structured result of an informational tool.
///
/// Serializes as `{"status": "success", "report": ...}` or
/// `{"status": "error", "error_message": ...}`; the payload field is fixed by
/// the status, so the two can never be present together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    Success { report: String },
    Error { error_message: String },
}

impl ToolResult {
    pub fn success(report: impl Into<String>) -> Self {
        Self::Success {
            report: report.into(),
        }
    }

    pub fn error(error_message: impl Into<String>) -> Self {
        Self::Error {
            error_message: error_message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The human-readable payload, whichever variant this is.
    pub fn text(&self) -> &str {
        match self {
            Self::Success { report } => report,
            Self::Error { error_message } => error_message,
        }
    }
}

/// What a tool hands back: a structured record or, for non-informational
/// tools such as greetings, plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolValue {
    Structured(ToolResult),
    Text(String),
}

impl ToolValue {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Structured(result) => result.is_success(),
            Self::Text(_) => true,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Structured(result) => result.text(),
            Self::Text(text) => text,
        }
    }

    /// Encode the value the way it is presented to the decision engine.
    pub fn to_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(result) => {
                serde_json::to_string(result).unwrap_or_else(|_| result.text().to_string())
            }
        }
    }

    /// Inverse of [`ToolValue::to_content`].
    pub fn from_content(content: &str) -> Self {
        match serde_json::from_str::<ToolResult>(content) {
            Ok(result) => Self::Structured(result),
            Err(_) => Self::Text(content.to_string()),
        }
    }
}

impl From<ToolResult> for ToolValue {
    fn from(result: ToolResult) -> Self {
        Self::Structured(result)
    }
}

impl From<String> for ToolValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A tool value bound to the call that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub tool_call_id: String,
    pub name: String,
    pub value: ToolValue,
}

impl ToolOutcome {
    pub fn success(&self) -> bool {
        self.value.is_success()
    }
}

// ---------------------------------------------------------------------------
// Inference types
// ---------------------------------------------------------------------------

/// A chat message in the multi-turn conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Tool calls requested by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Id of the call a tool message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(ChatRole::Assistant, content)
    }

    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.unwrap_or_default(),
            tool_calls,
            tool_call_id: None,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool call request from the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Build a call with a freshly generated id.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: format!("call_{}", ulid::Ulid::new()),
            name: name.into(),
            arguments,
        }
    }
}

/// Response from inference including potential tool calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

/// Token usage from an inference call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// One query sent by the driver and the final text it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
}
