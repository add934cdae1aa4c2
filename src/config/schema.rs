//! Configuration schema for config.toml.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Application name the session is registered under.
    pub app_name: String,

    /// User the conversation runs as.
    pub user_id: String,

    /// Session identifier for the conversation.
    pub session_id: String,

    /// Model identifier every agent in the team is built with.
    pub model: String,

    /// Base URL of the OpenAI-compatible inference endpoint.
    pub api_base_url: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Maximum tokens per inference call.
    pub max_tokens_per_turn: u32,

    /// Sampling temperature.
    pub temperature: f64,

    /// Decisions allowed in one turn before the runner escalates.
    pub max_steps_per_turn: u32,

    /// Number of recent messages replayed to the model.
    pub history_window: usize,

    /// Log level (debug, info, warn, error).
    pub log_level: String,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            app_name: "weather_tutorial_agent_team".into(),
            user_id: "user_1_agent_team".into(),
            session_id: "session_001_agent_team".into(),
            model: "gemini-2.0-flash".into(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".into(),
            api_key_env: "GOOGLE_API_KEY".into(),
            max_tokens_per_turn: 1024,
            temperature: 0.7,
            max_steps_per_turn: 8,
            history_window: 20,
            log_level: "info".into(),
        }
    }
}

impl TeamConfig {
    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps_per_turn == 0 {
            return Err(ConfigError::Invalid(
                "max_steps_per_turn must be at least 1".into(),
            ));
        }
        if self.history_window == 0 {
            return Err(ConfigError::Invalid(
                "history_window must be at least 1".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid("api_key_env must not be empty".into()));
        }
        Ok(())
    }
}
