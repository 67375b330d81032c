use std::{path::PathBuf, time::Duration};

use clap::Parser;
use ledger::{Settings, default_token_path};
use serde::Deserialize;

use crate::{commands::Command, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/thing_ledger.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub token_path: PathBuf,
    pub level: String,
    pub close_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            token_path: PathBuf::from(default_token_path()),
            level: "info".to_string(),
            close_delay_ms: 0,
        }
    }
}

impl AppConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            close_delay: Duration::from_millis(self.close_delay_ms),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "thing-ledger", version)]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:8080).
    #[arg(long)]
    pub base_url: Option<String>,
    /// Override where the session token is kept.
    #[arg(long)]
    pub token_path: Option<PathBuf>,
    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub level: Option<String>,
    /// Override the pause before a saved form closes, in milliseconds.
    #[arg(long)]
    pub close_delay_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

pub fn load(args: &Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("THING_LEDGER"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(token_path) = &args.token_path {
        settings.token_path = token_path.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if let Some(close_delay_ms) = args.close_delay_ms {
        settings.close_delay_ms = close_delay_ms;
    }

    Ok(settings)
}
