// models.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Poll {
    pub id: i32,
    pub title: String,
    pub owner_username: String,
}

/// One option of a poll, joined with the poll it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PollOption {
    pub poll_id: i32,
    pub title: String,
    pub owner_username: String,
    pub option_id: i32,
    pub option_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub username: String,
    pub option_id: i32,
}

/// Raw per-option vote count as returned by the grouping query.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OptionVoteCount {
    pub option_id: i32,
    pub option_text: String,
    pub vote_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    /// Seconds since the Unix epoch.
    pub release_timestamp: i64,
}
