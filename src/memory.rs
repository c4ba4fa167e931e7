// src/memory.rs
//! In-process stores with the same semantics as the PostgreSQL ones. The
//! console shells run against these in tests.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::{Movie, OptionVoteCount, Poll, PollOption, Vote};
use crate::poll::PollStore;
use crate::watchlist::WatchlistStore;

#[derive(Debug, Clone)]
struct OptionRow {
    id: i32,
    option_text: String,
    poll_id: i32,
}

#[derive(Debug, Default)]
struct PollTables {
    polls: Vec<Poll>,
    options: Vec<OptionRow>,
    votes: Vec<Vote>,
    next_poll_id: i32,
    next_option_id: i32,
}

impl PollTables {
    fn joined_options(&self, poll: &Poll) -> Vec<PollOption> {
        self.options
            .iter()
            .filter(|o| o.poll_id == poll.id)
            .map(|o| PollOption {
                poll_id: poll.id,
                title: poll.title.clone(),
                owner_username: poll.owner_username.clone(),
                option_id: o.id,
                option_text: o.option_text.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct MemoryPollStore {
    tables: Mutex<PollTables>,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PollStore for MemoryPollStore {
    async fn create_poll(
        &self,
        title: &str,
        owner: &str,
        options: &[String],
    ) -> Result<i32, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.next_poll_id += 1;
        let poll_id = tables.next_poll_id;
        tables.polls.push(Poll {
            id: poll_id,
            title: title.to_string(),
            owner_username: owner.to_string(),
        });
        for option_text in options {
            tables.next_option_id += 1;
            let id = tables.next_option_id;
            tables.options.push(OptionRow {
                id,
                option_text: option_text.clone(),
                poll_id,
            });
        }
        Ok(poll_id)
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, StoreError> {
        Ok(self.tables.lock().await.polls.clone())
    }

    async fn get_poll_options(&self, poll_id: i32) -> Result<Vec<PollOption>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .polls
            .iter()
            .find(|p| p.id == poll_id)
            .map(|poll| tables.joined_options(poll))
            .unwrap_or_default())
    }

    async fn get_latest_poll(&self) -> Result<Vec<PollOption>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .polls
            .iter()
            .max_by_key(|p| p.id)
            .map(|poll| tables.joined_options(poll))
            .unwrap_or_default())
    }

    async fn cast_vote(&self, username: &str, option_id: i32) -> Result<(), StoreError> {
        self.tables.lock().await.votes.push(Vote {
            username: username.to_string(),
            option_id,
        });
        Ok(())
    }

    async fn option_vote_counts(&self, poll_id: i32) -> Result<Vec<OptionVoteCount>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .options
            .iter()
            .filter(|o| o.poll_id == poll_id)
            .map(|o| OptionVoteCount {
                option_id: o.id,
                option_text: o.option_text.clone(),
                vote_count: tables.votes.iter().filter(|v| v.option_id == o.id).count() as i64,
            })
            .collect())
    }

    async fn get_random_voter_for_option(
        &self,
        option_id: i32,
    ) -> Result<Option<Vote>, StoreError> {
        let tables = self.tables.lock().await;
        let votes: Vec<&Vote> = tables
            .votes
            .iter()
            .filter(|v| v.option_id == option_id)
            .collect();
        Ok(votes.choose(&mut rand::thread_rng()).map(|v| (*v).clone()))
    }
}

#[derive(Debug, Default)]
struct WatchlistTables {
    movies: Vec<Movie>,
    users: Vec<String>,
    watched: Vec<(String, i32)>,
    next_movie_id: i32,
}

#[derive(Debug, Default)]
pub struct MemoryWatchlistStore {
    tables: Mutex<WatchlistTables>,
}

impl MemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatchlistStore for MemoryWatchlistStore {
    async fn add_movie(&self, title: &str, release_timestamp: i64) -> Result<i32, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.next_movie_id += 1;
        let id = tables.next_movie_id;
        tables.movies.push(Movie {
            id,
            title: title.to_string(),
            release_timestamp,
        });
        Ok(id)
    }

    async fn get_movies(&self, released_after: Option<i64>) -> Result<Vec<Movie>, StoreError> {
        let tables = self.tables.lock().await;
        let mut movies: Vec<Movie> = tables
            .movies
            .iter()
            .filter(|m| released_after.map_or(true, |after| m.release_timestamp > after))
            .cloned()
            .collect();
        if released_after.is_some() {
            movies.sort_by_key(|m| (m.release_timestamp, m.id));
        }
        Ok(movies)
    }

    async fn add_user(&self, username: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u == username) {
            tables.users.push(username.to_string());
        }
        Ok(())
    }

    async fn watch_movie(&self, username: &str, movie_id: i32) -> Result<(), StoreError> {
        self.tables
            .lock()
            .await
            .watched
            .push((username.to_string(), movie_id));
        Ok(())
    }

    async fn get_watched_movies(&self, username: &str) -> Result<Vec<Movie>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .movies
            .iter()
            .filter(|m| {
                tables
                    .watched
                    .iter()
                    .any(|(user, movie_id)| user == username && *movie_id == m.id)
            })
            .cloned()
            .collect())
    }

    async fn search_movies(&self, term: &str) -> Result<Vec<Movie>, StoreError> {
        let needle = term.to_lowercase();
        let tables = self.tables.lock().await;
        Ok(tables
            .movies
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
