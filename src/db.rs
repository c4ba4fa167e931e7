// src/db.rs
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::StoreError;

const CREATE_POLLS: &str = "CREATE TABLE IF NOT EXISTS polls
(id SERIAL PRIMARY KEY, title TEXT NOT NULL, owner_username TEXT NOT NULL);";

const CREATE_OPTIONS: &str = "CREATE TABLE IF NOT EXISTS options
(id SERIAL PRIMARY KEY, option_text TEXT NOT NULL, poll_id INTEGER NOT NULL);";

const CREATE_VOTES: &str = "CREATE TABLE IF NOT EXISTS votes
(username TEXT NOT NULL, option_id INTEGER NOT NULL);";

const CREATE_MOVIES: &str = "CREATE TABLE IF NOT EXISTS movies
(id SERIAL PRIMARY KEY, title TEXT NOT NULL, release_timestamp BIGINT NOT NULL);";

const CREATE_USERS: &str = "CREATE TABLE IF NOT EXISTS users
(username TEXT PRIMARY KEY);";

const CREATE_WATCHED: &str = "CREATE TABLE IF NOT EXISTS watched
(user_username TEXT NOT NULL, movie_id INTEGER NOT NULL);";

/// Open the session's single connection.
///
/// The pool is capped at one connection so every operation runs serially on
/// the same session, the way a console app with one long-lived connection
/// would.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await?;
    info!("connected to database");
    Ok(pool)
}

pub async fn create_poll_tables(pool: &PgPool) -> Result<(), StoreError> {
    create_tables(pool, &[CREATE_POLLS, CREATE_OPTIONS, CREATE_VOTES]).await
}

pub async fn create_watchlist_tables(pool: &PgPool) -> Result<(), StoreError> {
    create_tables(pool, &[CREATE_MOVIES, CREATE_USERS, CREATE_WATCHED]).await
}

async fn create_tables(pool: &PgPool, statements: &[&str]) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;
    for statement in statements {
        debug!(statement, "ensuring table");
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    Ok(())
}
