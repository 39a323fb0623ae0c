//! CLI command definitions and dispatch.

pub mod access;
pub mod config;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use nbgrader_core::config::AppConfig;
use nbgrader_core::result::AppResult;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// nbgrader course access: inspect and manage which students may open which courses
#[derive(Debug, Parser)]
#[command(name = "nbgrader-access", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (config/default.toml is read if present)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Course access queries and roster changes
    Access(access::AccessArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Access(args) => access::execute(args, config, self.format).await,
            Commands::Config(args) => config::execute(args, config, self.config_path(), self.format),
        }
    }

    /// Path of the configuration file in effect.
    pub fn config_path(&self) -> &str {
        self.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    }
}

/// Helper: load configuration. A file named with `--config` must exist; the
/// default file may be absent.
pub fn load_config(config_path: Option<&str>) -> AppResult<AppConfig> {
    AppConfig::load(
        config_path.unwrap_or(DEFAULT_CONFIG_PATH),
        config_path.is_some(),
    )
}
