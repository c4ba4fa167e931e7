// config.rs
use clap::{ArgAction, Parser, Subcommand};
use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no database URL given (pass --database-url, set DATABASE_URL, or type one at the prompt)")]
    MissingDatabaseUrl,

    #[error("failed to read the database URL: {0}")]
    Prompt(#[from] std::io::Error),
}

#[derive(Debug, Parser)]
#[command(name = "ballotbox", version, about = "Console poll and movie watchlist tracker")]
pub struct Cli {
    #[command(subcommand)]
    pub app: App,

    /// PostgreSQL connection string; falls back to DATABASE_URL.
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Raise log verbosity (-v info, -vv debug). Ignored when RUST_LOG is set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum App {
    /// Create polls, vote, and tally results
    Polls,
    /// Track upcoming and watched movies
    Watchlist,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app: App,
    pub database_url: String,
    pub log_filter: String,
}

impl Config {
    /// Assemble the session config. The database URL comes from the command
    /// line, then `env_url`, then `prompt` as a last resort.
    pub fn resolve<F>(cli: Cli, env_url: Option<String>, prompt: F) -> Result<Self, ConfigError>
    where
        F: FnOnce() -> std::io::Result<String>,
    {
        let database_url = match non_empty(cli.database_url).or_else(|| non_empty(env_url)) {
            Some(url) => url,
            None => non_empty(Some(prompt()?)).ok_or(ConfigError::MissingDatabaseUrl)?,
        };

        Ok(Self {
            app: cli.app,
            database_url,
            log_filter: default_log_filter(cli.verbose).to_string(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
