// error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("input ended before the action was complete")]
    UnexpectedEof,

    #[error("`{input}` is not a valid number")]
    InvalidNumber {
        input: String,
        source: std::num::ParseIntError,
    },

    #[error("`{input}` is not a valid date (expected dd-mm-YYYY)")]
    InvalidDate {
        input: String,
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
