// src/main.rs
use std::io::{self, BufRead, Write};

use anyhow::Context;
use ballotbox::config::{App, Cli, Config, DATABASE_URL_VAR};
use ballotbox::db;
use ballotbox::handlers::Console;
use ballotbox::poll::PgPollStore;
use ballotbox::routes;
use ballotbox::watchlist::PgWatchlistStore;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // Load environment variables from .env file

    let cli = Cli::parse();
    let config = Config::resolve(cli, std::env::var(DATABASE_URL_VAR).ok(), prompt_database_url)
        .context("failed to resolve configuration")?;
    init_tracing(&config.log_filter);

    let pool = db::connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    let mut console = Console::new(io::stdin().lock(), io::stdout());
    match config.app {
        App::Polls => {
            db::create_poll_tables(&pool)
                .await
                .context("failed to create poll tables")?;
            let store = PgPollStore::new(pool.clone());
            routes::run_polls(&mut console, &store).await?;
        }
        App::Watchlist => {
            db::create_watchlist_tables(&pool)
                .await
                .context("failed to create watchlist tables")?;
            let store = PgWatchlistStore::new(pool.clone());
            routes::run_watchlist(&mut console, &store).await?;
        }
    }

    pool.close().await;
    info!("session finished");
    Ok(())
}

/// Logs go to stderr so they never interleave with the menu on stdout.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn prompt_database_url() -> io::Result<String> {
    print!("Enter the database connection string: ");
    io::stdout().flush()?;
    let mut url = String::new();
    io::stdin().lock().read_line(&mut url)?;
    Ok(url)
}
