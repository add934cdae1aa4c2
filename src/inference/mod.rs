//! The decision process: what the active agent does next.
//!
//! The runner never interprets utterances itself. It hands the active
//! agent, the conversation so far and the permitted tools to a
//! [`DecisionEngine`] and acts on the [`Decision`] it returns.

pub mod client;
pub mod rules;

pub use client::InferenceClient;
pub use rules::RuleEngine;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::agent::AgentDescriptor;
use crate::tools::{ToolDefinition, TRANSFER_TOOL};
use crate::types::{ChatMessage, ToolCall};

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("inference failed ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse inference response: {0}")]
    Decode(String),

    #[error("transfer_to_agent was called without an agent_name")]
    MalformedTransfer,
}

/// Everything the decision engine may look at for one step.
#[derive(Debug)]
pub struct DecisionRequest<'a> {
    /// The agent currently in control of the turn.
    pub agent: &'a AgentDescriptor,
    /// The user's query for this turn.
    pub utterance: &'a str,
    /// System prompt followed by the visible history.
    pub messages: Vec<ChatMessage>,
    /// Tools the agent may call, including the transfer tool when it has
    /// sub-agents.
    pub tools: Vec<ToolDefinition>,
}

/// What the active agent does next.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Final answer for the turn. `None` means the engine produced no text.
    Respond { text: Option<String> },
    /// Run the agent's own tools, then decide again.
    CallTools { calls: Vec<ToolCall> },
    /// Hand the rest of the turn to a sub-agent.
    Transfer { call: ToolCall, agent_name: String },
    /// Give up on the turn.
    Escalate { message: Option<String> },
}

impl Decision {
    pub fn respond(text: impl Into<String>) -> Self {
        Self::Respond {
            text: Some(text.into()),
        }
    }

    pub fn transfer(agent_name: impl Into<String>) -> Self {
        let agent_name = agent_name.into();
        Self::Transfer {
            call: ToolCall::new(TRANSFER_TOOL, json!({ "agent_name": agent_name })),
            agent_name,
        }
    }
}

/// A capability that decides, step by step, how an agent handles a turn.
#[async_trait]
pub trait DecisionEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn decide(&self, request: DecisionRequest<'_>) -> Result<Decision, InferenceError>;
}
