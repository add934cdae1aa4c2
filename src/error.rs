//! Error types shared across the runtime.
//!
//! Expected misses (an unknown city, say) are never errors: tools report them
//! as [`crate::types::ToolResult::Error`] values. The types here cover
//! configuration problems and faults raised while a turn is running.

use std::path::PathBuf;
use thiserror::Error;

use crate::inference::InferenceError;
use crate::session::SessionError;

/// Longest fault text reported to the user, in characters.
pub const MAX_FAULT_CHARS: usize = 512;

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Problems found while assembling configuration or credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing {var} environment variable; set it in a .env file or your environment")]
    MissingApiKey { var: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {} (TOML): {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write config file {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("agent team could not be built; see the log for the failing agent")]
    AgentTree,
}

/// Reasons an agent descriptor is rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentBuildError {
    #[error("invalid agent name '{0}': must start with a letter or underscore and contain only letters, digits and underscores")]
    InvalidName(String),

    #[error("agent name '{0}' is reserved")]
    ReservedName(String),

    #[error("agent '{agent}' has an invalid model identifier '{model}'")]
    InvalidModel { agent: String, model: String },

    #[error("agent '{0}' has an empty instruction")]
    EmptyInstruction(String),

    #[error("agent '{agent}' declares tool '{tool}' more than once")]
    DuplicateTool { agent: String, tool: String },

    #[error("agent name '{0}' appears more than once in the agent tree")]
    DuplicateAgentName(String),
}

/// Faults raised while the runner is processing a turn.
#[derive(Debug, Error)]
pub enum RuntimeFault {
    #[error("decision engine failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("agent '{from}' tried to transfer to unknown agent '{target}'")]
    UnknownAgent { from: String, target: String },
}

/// Top-level outcome of a process run.
#[derive(Debug, Error)]
pub enum TeamError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] RuntimeFault),
}

impl TeamError {
    /// Process exit code for this fault kind.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Runtime(_) => 1,
        }
    }
}
