//! Events recorded in a session, one per step of a turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::USER_AUTHOR;
use crate::types::{ToolCall, ToolOutcome};

/// Side effects an event asks the runner to perform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventActions {
    /// Agent that takes over the rest of the turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_to_agent: Option<String>,
    /// The turn ended without an answer.
    #[serde(default)]
    pub escalate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    /// Groups the events of one turn.
    pub invocation_id: String,
    /// `"user"` or the name of the agent that produced the event.
    pub author: String,
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub tool_outcomes: Vec<ToolOutcome>,
    #[serde(default)]
    pub actions: EventActions,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    fn new(invocation_id: &str, author: &str) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            invocation_id: invocation_id.to_string(),
            author: author.to_string(),
            content: None,
            tool_calls: Vec::new(),
            tool_outcomes: Vec::new(),
            actions: EventActions::default(),
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn user(invocation_id: &str, text: &str) -> Self {
        Self {
            content: Some(text.to_string()),
            ..Self::new(invocation_id, USER_AUTHOR)
        }
    }

    /// An agent's reply text; `None` when the agent produced nothing.
    pub fn reply(invocation_id: &str, author: &str, text: Option<String>) -> Self {
        Self {
            content: text,
            ..Self::new(invocation_id, author)
        }
    }

    pub fn tool_calls(invocation_id: &str, author: &str, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::new(invocation_id, author)
        }
    }

    pub fn tool_outcomes(invocation_id: &str, author: &str, outcomes: Vec<ToolOutcome>) -> Self {
        Self {
            tool_outcomes: outcomes,
            ..Self::new(invocation_id, author)
        }
    }

    pub fn transfer(
        invocation_id: &str,
        author: &str,
        outcome: ToolOutcome,
        target: &str,
    ) -> Self {
        Self {
            tool_outcomes: vec![outcome],
            actions: EventActions {
                transfer_to_agent: Some(target.to_string()),
                escalate: false,
            },
            ..Self::new(invocation_id, author)
        }
    }

    pub fn escalation(invocation_id: &str, author: &str, message: Option<String>) -> Self {
        Self {
            actions: EventActions {
                transfer_to_agent: None,
                escalate: true,
            },
            error_message: message,
            ..Self::new(invocation_id, author)
        }
    }

    pub fn is_user(&self) -> bool {
        self.author == USER_AUTHOR
    }

    /// Whether this is the terminal event of its turn.
    pub fn is_final_response(&self) -> bool {
        if self.actions.escalate {
            return true;
        }
        !self.is_user()
            && self.tool_calls.is_empty()
            && self.tool_outcomes.is_empty()
            && self.actions.transfer_to_agent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ToolResult, ToolValue};
    use serde_json::json;

    #[test]
    fn test_final_response_classification() {
        let inv = "inv_1";
        assert!(!Event::user(inv, "hi").is_final_response());
        assert!(Event::reply(inv, "agent", Some("hello".into())).is_final_response());
        assert!(Event::reply(inv, "agent", None).is_final_response());
        assert!(Event::escalation(inv, "agent", None).is_final_response());

        let call = ToolCall::new("get_weather", json!({"city": "Paris"}));
        assert!(!Event::tool_calls(inv, "agent", vec![call.clone()]).is_final_response());

        let outcome = ToolOutcome {
            tool_call_id: call.id,
            name: call.name,
            value: ToolValue::Structured(ToolResult::error("nope")),
        };
        assert!(!Event::tool_outcomes(inv, "agent", vec![outcome.clone()]).is_final_response());
        assert!(!Event::transfer(inv, "agent", outcome, "other").is_final_response());
    }
}
