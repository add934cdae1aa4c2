//! weather-team: coordinator agent with greeting and farewell specialists.
//!
//! Usage:
//!   weather-team run              Run the fixed three-turn conversation
//!   weather-team run --offline    Same, with the built-in keyword engine
//!   weather-team agents           Show the agent tree and tool metadata
//!   weather-team init             Write a default config file

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use weather_team::agent::{self, AgentDescriptor};
use weather_team::config::{self, Credentials, TeamConfig};
use weather_team::driver;
use weather_team::error::{ConfigError, TeamError};
use weather_team::inference::{DecisionEngine, InferenceClient, RuleEngine};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "weather-team")]
#[command(version)]
#[command(about = "Weather agent team with greeting and farewell delegation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ~/.weather-team/config.toml).
    #[arg(long)]
    config: Option<String>,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the team conversation.
    Run {
        /// Route queries with the keyword rule engine instead of the remote model.
        #[arg(long)]
        offline: bool,
    },

    /// Print the agent tree and the metadata of every tool.
    Agents,

    /// Write a config file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_deref()
        .map(config::resolve_path)
        .unwrap_or_else(config::default_config_path);

    let loaded = config::load_config(&config_path);

    // Initialize logging
    let level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".into());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    // `init` must work even when the existing file is broken
    let result = match (cli.command, loaded) {
        (Commands::Init { force }, _) => cmd_init(&config_path, force),
        (_, Err(e)) => Err(e.into()),
        (Commands::Run { offline }, Ok(cfg)) => cmd_run(&cfg, offline).await,
        (Commands::Agents, Ok(cfg)) => cmd_agents(&cfg),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::from(e.exit_code())
        }
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_run(cfg: &TeamConfig, offline: bool) -> Result<(), TeamError> {
    let engine: Arc<dyn DecisionEngine> = if offline {
        info!("Offline mode: using the keyword rule engine");
        Arc::new(RuleEngine::new())
    } else {
        let credentials = Credentials::from_env(&cfg.api_key_env)?;
        Arc::new(InferenceClient::from_config(cfg, credentials))
    };

    println!(
        "{} Starting team conversation (model: {}, engine: {})",
        ">>>".green().bold(),
        cfg.model,
        engine.name(),
    );

    driver::run_team_conversation(cfg, engine).await?;
    Ok(())
}

fn cmd_agents(cfg: &TeamConfig) -> Result<(), TeamError> {
    let root = agent::build_team(&cfg.model).ok_or(ConfigError::AgentTree)?;

    println!();
    println!("{}", "=== Agent Team ===".bold());
    print_agent(&root, 0);

    println!();
    println!("{}", "=== Tool Metadata ===".bold());
    print_tools(&root);
    println!();
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<(), TeamError> {
    if path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            "!".yellow().bold(),
            path.display()
        );
        return Ok(());
    }

    config::save_config(&TeamConfig::default(), path).map_err(|e| ConfigError::Write {
        path: path.to_path_buf(),
        message: format!("{:#}", e),
    })?;

    println!("Config written to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_agent(agent: &AgentDescriptor, depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{}{} {}",
        indent,
        agent.name.bold(),
        format!("({})", agent.model).dimmed()
    );
    if !agent.description.is_empty() {
        println!("{}  {}", indent, agent.description);
    }
    println!("{}  tools: {}", indent, agent.tools.names().join(", "));
    for sub in &agent.sub_agents {
        print_agent(sub, depth + 1);
    }
}

fn print_tools(agent: &AgentDescriptor) {
    for def in agent.tools.definitions() {
        match serde_json::to_string_pretty(&def) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to render tool '{}': {}", def.name, e),
        }
    }
    for sub in &agent.sub_agents {
        print_tools(sub);
    }
}
