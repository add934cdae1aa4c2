//! Conversation driver: sends a fixed list of queries through the runner.

use colored::Colorize;
use std::sync::Arc;
use tracing::{error, info};

use crate::agent;
use crate::config::TeamConfig;
use crate::error::{truncate_text, ConfigError, RuntimeFault, TeamError, MAX_FAULT_CHARS};
use crate::inference::DecisionEngine;
use crate::runner::Runner;
use crate::session::{Event, InMemorySessionService};
use crate::types::ConversationTurn;

/// The queries the team conversation sends, in order.
pub const DEFAULT_QUERIES: &[&str] = &[
    "Hello there!",
    "What is the weather in New York?",
    "Thanks, bye!",
];

/// Text reported when a turn ends without any final response.
pub const NO_RESPONSE: &str = "Agent did not produce a final response.";

/// Pick the user-visible text out of a turn's events.
///
/// Precedence: the terminal event's content, then its escalation message,
/// then [`NO_RESPONSE`].
pub fn final_response_text(events: &[Event]) -> String {
    let Some(event) = events.iter().find(|e| e.is_final_response()) else {
        return NO_RESPONSE.to_string();
    };

    if let Some(text) = event.content.as_deref().filter(|t| !t.is_empty()) {
        return text.to_string();
    }
    if event.actions.escalate {
        return format!(
            "Agent escalated: {}",
            event.error_message.as_deref().unwrap_or("No specific message.")
        );
    }
    NO_RESPONSE.to_string()
}

/// Send one query and report the final response.
///
/// Never fails: a fault inside the turn becomes the reported response,
/// cut to [`MAX_FAULT_CHARS`].
pub async fn call_agent(
    runner: &Runner,
    user_id: &str,
    session_id: &str,
    query: &str,
) -> ConversationTurn {
    println!("\n{} {}", ">>> User Query:".cyan().bold(), query);

    let response = match runner.run(user_id, session_id, query).await {
        Ok(outcome) => final_response_text(&outcome.events),
        Err(e) => {
            let fault = truncate_text(&e.to_string(), MAX_FAULT_CHARS);
            error!("Turn failed: {}", fault);
            format!("Error during agent execution: {}", fault)
        }
    };

    println!("{} {}", "<<< Agent Response:".green().bold(), response);

    ConversationTurn {
        query: query.to_string(),
        response,
    }
}

/// Send queries one after another; each turn completes before the next starts.
pub async fn run_conversation(
    runner: &Runner,
    user_id: &str,
    session_id: &str,
    queries: &[&str],
) -> Vec<ConversationTurn> {
    let mut turns = Vec::with_capacity(queries.len());
    for query in queries {
        turns.push(call_agent(runner, user_id, session_id, query).await);
    }
    turns
}

/// Build the team, open the configured session, and run [`DEFAULT_QUERIES`].
pub async fn run_team_conversation(
    config: &TeamConfig,
    engine: Arc<dyn DecisionEngine>,
) -> Result<Vec<ConversationTurn>, TeamError> {
    println!("\n{}", "--- Testing Agent Team Delegation ---".bold());

    let Some(root) = agent::build_team(&config.model) else {
        error!("Cannot run conversation without a properly configured root agent.");
        return Err(ConfigError::AgentTree.into());
    };

    let sessions = Arc::new(InMemorySessionService::new());
    sessions
        .create_session(&config.app_name, &config.user_id, &config.session_id)
        .await
        .map_err(RuntimeFault::from)?;

    let runner = Runner::new(root, &config.app_name, sessions, engine)
        .with_limits(config.max_steps_per_turn, config.history_window);

    let turns = run_conversation(&runner, &config.user_id, &config.session_id, DEFAULT_QUERIES).await;
    info!("Conversation finished: {} turns", turns.len());
    Ok(turns)
}
