// src/poll.rs
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{OptionVoteCount, Poll, PollOption, Vote};

const SELECT_ALL_POLLS: &str = "SELECT id, title, owner_username FROM polls ORDER BY id;";

const SELECT_POLL_WITH_OPTIONS: &str = "SELECT
    polls.id AS poll_id, polls.title, polls.owner_username,
    options.id AS option_id, options.option_text
FROM polls
JOIN options ON polls.id = options.poll_id
WHERE polls.id = $1
ORDER BY options.id;";

const SELECT_LATEST_POLL: &str = "SELECT
    polls.id AS poll_id, polls.title, polls.owner_username,
    options.id AS option_id, options.option_text
FROM polls
JOIN options ON polls.id = options.poll_id
WHERE polls.id = (SELECT id FROM polls ORDER BY id DESC LIMIT 1)
ORDER BY options.id;";

const SELECT_OPTION_VOTE_COUNTS: &str = "SELECT
    options.id AS option_id,
    options.option_text,
    COUNT(votes.option_id) AS vote_count
FROM options
LEFT JOIN votes ON options.id = votes.option_id
WHERE options.poll_id = $1
GROUP BY options.id, options.option_text
ORDER BY options.id;";

const SELECT_RANDOM_VOTE: &str =
    "SELECT username, option_id FROM votes WHERE option_id = $1 ORDER BY RANDOM() LIMIT 1;";

const INSERT_POLL_RETURN_ID: &str =
    "INSERT INTO polls (title, owner_username) VALUES ($1, $2) RETURNING id;";

const INSERT_VOTE: &str = "INSERT INTO votes (username, option_id) VALUES ($1, $2);";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionTally {
    pub option_id: i32,
    pub option_text: String,
    pub vote_count: i64,
    pub vote_percentage: f64,
}

/// Result of counting a poll's votes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Tally {
    /// Nobody has voted on any option of the poll (or the poll has no
    /// options at all), so there is no total to divide by.
    NoVotes,
    Counted {
        total_votes: i64,
        options: Vec<OptionTally>,
    },
}

impl Tally {
    pub fn from_counts(counts: Vec<OptionVoteCount>) -> Self {
        let total_votes: i64 = counts.iter().map(|c| c.vote_count).sum();
        if total_votes == 0 {
            return Tally::NoVotes;
        }

        let options = counts
            .into_iter()
            .map(|c| OptionTally {
                vote_percentage: c.vote_count as f64 / total_votes as f64 * 100.0,
                option_id: c.option_id,
                option_text: c.option_text,
                vote_count: c.vote_count,
            })
            .collect();

        Tally::Counted {
            total_votes,
            options,
        }
    }
}

/// Persistence for polls, their options and votes.
///
/// Nothing here checks referential integrity: votes for unknown options are
/// stored, lookups of unknown polls come back empty.
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Insert the poll and one option row per text as a single unit.
    /// An empty `options` slice still creates the poll.
    async fn create_poll(
        &self,
        title: &str,
        owner: &str,
        options: &[String],
    ) -> Result<i32, StoreError>;

    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError>;

    async fn get_poll_options(&self, poll_id: i32) -> Result<Vec<PollOption>, StoreError>;

    /// Options of the poll with the highest id.
    async fn get_latest_poll(&self) -> Result<Vec<PollOption>, StoreError>;

    async fn cast_vote(&self, username: &str, option_id: i32) -> Result<(), StoreError>;

    /// Vote count for every option of `poll_id`, including options nobody
    /// voted for.
    async fn option_vote_counts(&self, poll_id: i32) -> Result<Vec<OptionVoteCount>, StoreError>;

    /// Uniformly random vote among all votes for `option_id`.
    async fn get_random_voter_for_option(
        &self,
        option_id: i32,
    ) -> Result<Option<Vote>, StoreError>;

    async fn get_tally(&self, poll_id: i32) -> Result<Tally, StoreError> {
        let counts = self.option_vote_counts(poll_id).await?;
        Ok(Tally::from_counts(counts))
    }
}

/// PostgreSQL-backed poll store.
pub struct PgPollStore {
    pool: PgPool,
}

impl PgPollStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PollStore for PgPollStore {
    async fn create_poll(
        &self,
        title: &str,
        owner: &str,
        options: &[String],
    ) -> Result<i32, StoreError> {
        let mut tx = self.pool.begin().await?;

        let poll_id: i32 = sqlx::query_scalar(INSERT_POLL_RETURN_ID)
            .bind(title)
            .bind(owner)
            .fetch_one(&mut *tx)
            .await?;

        if !options.is_empty() {
            let mut insert: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO options (option_text, poll_id) ");
            insert.push_values(options, |mut row, option_text| {
                row.push_bind(option_text).push_bind(poll_id);
            });
            insert.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        info!(poll_id, title, owner, options = options.len(), "created poll");
        Ok(poll_id)
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        let polls = sqlx::query_as::<_, Poll>(SELECT_ALL_POLLS)
            .fetch_all(&self.pool)
            .await?;
        Ok(polls)
    }

    async fn get_poll_options(&self, poll_id: i32) -> Result<Vec<PollOption>, StoreError> {
        let options = sqlx::query_as::<_, PollOption>(SELECT_POLL_WITH_OPTIONS)
            .bind(poll_id)
            .fetch_all(&self.pool)
            .await?;
        debug!(poll_id, rows = options.len(), "fetched poll options");
        Ok(options)
    }

    async fn get_latest_poll(&self) -> Result<Vec<PollOption>, StoreError> {
        let options = sqlx::query_as::<_, PollOption>(SELECT_LATEST_POLL)
            .fetch_all(&self.pool)
            .await?;
        Ok(options)
    }

    async fn cast_vote(&self, username: &str, option_id: i32) -> Result<(), StoreError> {
        sqlx::query(INSERT_VOTE)
            .bind(username)
            .bind(option_id)
            .execute(&self.pool)
            .await?;
        info!(username, option_id, "vote recorded");
        Ok(())
    }

    async fn option_vote_counts(&self, poll_id: i32) -> Result<Vec<OptionVoteCount>, StoreError> {
        let counts = sqlx::query_as::<_, OptionVoteCount>(SELECT_OPTION_VOTE_COUNTS)
            .bind(poll_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(counts)
    }

    async fn get_random_voter_for_option(
        &self,
        option_id: i32,
    ) -> Result<Option<Vote>, StoreError> {
        let vote = sqlx::query_as::<_, Vote>(SELECT_RANDOM_VOTE)
            .bind(option_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vote)
    }
}
