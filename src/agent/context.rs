//! Message context builder for the runner.
//!
//! Turns the session's event log into the message list one agent sees.
//! Events produced by other agents are folded into user messages prefixed
//! with "For context:", so an agent never sees tool calls for tools it does
//! not own.

use crate::session::Event;
use crate::types::*;
use tracing::debug;

/// Build the full message history for a decision.
pub fn build_messages(
    system_prompt: &str,
    events: &[Event],
    agent_name: &str,
    history_window: usize,
) -> Vec<ChatMessage> {
    let mut history = Vec::new();
    for event in events {
        if event.is_user() {
            if let Some(text) = &event.content {
                history.push(ChatMessage::user(text.clone()));
            }
        } else if event.author == agent_name {
            push_own_event(&mut history, event);
        } else {
            push_foreign_event(&mut history, event);
        }
    }

    // Keep the last N messages. A window that starts inside a tool exchange
    // grows back to the assistant message that made the calls.
    let mut start = history.len().saturating_sub(history_window);
    while start > 0 && start < history.len() && history[start].role == ChatRole::Tool {
        start -= 1;
    }

    let mut messages = Vec::with_capacity(history.len() - start + 1);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history.drain(start..));

    debug!("Context for '{}': {} messages", agent_name, messages.len());
    messages
}

fn push_own_event(history: &mut Vec<ChatMessage>, event: &Event) {
    if !event.tool_calls.is_empty() {
        history.push(ChatMessage::assistant_tool_calls(
            event.content.clone(),
            event.tool_calls.clone(),
        ));
        return;
    }
    for outcome in &event.tool_outcomes {
        history.push(ChatMessage::tool(
            outcome.tool_call_id.clone(),
            outcome.value.to_content(),
        ));
    }
    if let Some(text) = &event.content {
        history.push(ChatMessage::assistant(text.clone()));
    }
}

fn push_foreign_event(history: &mut Vec<ChatMessage>, event: &Event) {
    for call in &event.tool_calls {
        history.push(ChatMessage::user(format!(
            "For context: [{}] called tool `{}` with parameters: {}",
            event.author, call.name, call.arguments
        )));
    }
    for outcome in &event.tool_outcomes {
        history.push(ChatMessage::user(format!(
            "For context: [{}] `{}` tool returned result: {}",
            event.author,
            outcome.name,
            outcome.value.to_content()
        )));
    }
    if let Some(text) = &event.content {
        history.push(ChatMessage::user(format!(
            "For context: [{}] said: {}",
            event.author, text
        )));
    }
}
