pub mod schema;

pub use schema::TeamConfig;

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Default config location (~/.weather-team/config.toml).
pub fn default_config_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".weather-team").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from(".weather-team/config.toml"))
}

/// Resolve a path that may contain `~` to an absolute path.
pub fn resolve_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Load config from the given path, or return defaults if it does not exist.
pub fn load_config(path: &Path) -> Result<TeamConfig, ConfigError> {
    let config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<TeamConfig>(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        TeamConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &TeamConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API credentials for the inference provider.
#[derive(Clone)]
pub struct Credentials {
    api_key: SecretString,
}

impl Credentials {
    /// Read the API key from `var`, loading a `.env` file first if present.
    pub fn from_env(var: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_value(var, std::env::var(var).ok())
    }

    /// Build credentials from an already looked-up value.
    pub fn from_value(var: &str, value: Option<String>) -> Result<Self, ConfigError> {
        match value {
            Some(key) if !key.trim().is_empty() => Ok(Self {
                api_key: SecretString::new(key.trim().to_string()),
            }),
            _ => Err(ConfigError::MissingApiKey { var: var.to_string() }),
        }
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, TeamConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = \"gemini-1.5-pro\"\nmax_steps_per_turn = 4\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.max_steps_per_turn, 4);
        assert_eq!(config.user_id, "user_1_agent_team");
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [unterminated").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = TeamConfig {
            session_id: "session_xyz".into(),
            ..TeamConfig::default()
        };

        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_credentials_require_value() {
        let err = Credentials::from_value("GOOGLE_API_KEY", None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey { ref var } if var == "GOOGLE_API_KEY"));

        assert!(Credentials::from_value("GOOGLE_API_KEY", Some("   ".into())).is_err());

        let creds = Credentials::from_value("GOOGLE_API_KEY", Some("abc123".into())).unwrap();
        assert_eq!(creds.api_key(), "abc123");
        assert!(!format!("{:?}", creds).contains("abc123"));
    }
}
