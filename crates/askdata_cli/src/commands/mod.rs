//! CLI command definitions.
//!
//! This module defines the command structure for the askdata CLI and the
//! shared setup every command needs (configuration, store, orchestrator).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use askdata_chat::{ChatConfig, HttpQueryGateway, MessageStore, Orchestrator, StaleResponsePolicy};

use crate::display::TerminalNotifier;

pub mod ask;
pub mod chat;

/// Default settings file, relative to the working directory.
pub const SETTINGS_PATH: &str = ".askdata/settings.json";

/// askdata - ask your data questions in plain language
#[derive(Parser)]
#[command(name = "askdata")]
#[command(version, about = "askdata - ask your data questions in plain language")]
#[command(long_about = r#"
askdata sends natural-language questions to a query backend and renders the
tabular answers as tables or as line, bar and pie charts.

COMMANDS:
  ask   → Ask one question and print the answer
  chat  → Interactive session; switch views and series per answer

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Query failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by all commands.
#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Query endpoint of the backend
    #[arg(long, global = true, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Request timeout in seconds (default: wait indefinitely)
    #[arg(long, global = true, env = "ASKDATA_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Settings file (default: .askdata/settings.json)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Ignore answers to questions superseded by a newer one
    #[arg(long, global = true)]
    pub drop_stale: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question
    Ask(ask::AskArgs),

    /// Start an interactive session
    Chat(chat::ChatArgs),
}

impl GlobalArgs {
    /// Resolve configuration: flags and env over the settings file over defaults.
    pub fn config(&self) -> Result<ChatConfig> {
        let path = self
            .settings
            .clone()
            .unwrap_or_else(|| PathBuf::from(SETTINGS_PATH));
        let mut config = ChatConfig::from_settings(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;

        if let Some(url) = &self.backend_url {
            config = config.endpoint(url.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.timeout(secs);
        }
        if self.drop_stale {
            config = config.stale_responses(StaleResponsePolicy::DropStale);
        }

        config.validate()?;
        debug!(endpoint = %config.endpoint, timeout = ?config.timeout_secs, "Resolved configuration");
        Ok(config)
    }

    /// Build an orchestrator over a fresh store.
    pub fn orchestrator(&self) -> Result<Orchestrator> {
        let config = self.config()?;
        let gateway = HttpQueryGateway::new(&config)?;

        Ok(Orchestrator::new(
            MessageStore::shared(),
            Arc::new(gateway),
            Arc::new(TerminalNotifier),
        )
        .with_policy(config.stale_responses))
    }
}
