// src/watchlist.rs
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::error::StoreError;
use crate::models::Movie;

const INSERT_MOVIE_RETURN_ID: &str =
    "INSERT INTO movies (title, release_timestamp) VALUES ($1, $2) RETURNING id;";

const SELECT_ALL_MOVIES: &str = "SELECT id, title, release_timestamp FROM movies ORDER BY id;";

const SELECT_UPCOMING_MOVIES: &str = "SELECT id, title, release_timestamp FROM movies
WHERE release_timestamp > $1
ORDER BY release_timestamp, id;";

const INSERT_USER: &str = "INSERT INTO users (username) VALUES ($1) ON CONFLICT DO NOTHING;";

const INSERT_WATCHED_MOVIE: &str =
    "INSERT INTO watched (user_username, movie_id) VALUES ($1, $2);";

const SELECT_WATCHED_MOVIES: &str = "SELECT movies.id, movies.title, movies.release_timestamp
FROM movies
JOIN watched ON movies.id = watched.movie_id
WHERE watched.user_username = $1
ORDER BY movies.id;";

const SEARCH_MOVIES: &str = "SELECT id, title, release_timestamp FROM movies
WHERE title ILIKE '%' || $1 || '%'
ORDER BY id;";

#[async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn add_movie(&self, title: &str, release_timestamp: i64) -> Result<i32, StoreError>;

    /// All movies, or only those releasing strictly after `released_after`.
    async fn get_movies(&self, released_after: Option<i64>) -> Result<Vec<Movie>, StoreError>;

    /// Registering an existing username is a no-op.
    async fn add_user(&self, username: &str) -> Result<(), StoreError>;

    async fn watch_movie(&self, username: &str, movie_id: i32) -> Result<(), StoreError>;

    async fn get_watched_movies(&self, username: &str) -> Result<Vec<Movie>, StoreError>;

    /// Case-insensitive substring match on the title.
    async fn search_movies(&self, term: &str) -> Result<Vec<Movie>, StoreError>;
}

pub struct PgWatchlistStore {
    pool: PgPool,
}

impl PgWatchlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WatchlistStore for PgWatchlistStore {
    async fn add_movie(&self, title: &str, release_timestamp: i64) -> Result<i32, StoreError> {
        let movie_id: i32 = sqlx::query_scalar(INSERT_MOVIE_RETURN_ID)
            .bind(title)
            .bind(release_timestamp)
            .fetch_one(&self.pool)
            .await?;
        info!(movie_id, title, "added movie");
        Ok(movie_id)
    }

    async fn get_movies(&self, released_after: Option<i64>) -> Result<Vec<Movie>, StoreError> {
        let movies = match released_after {
            Some(timestamp) => {
                sqlx::query_as::<_, Movie>(SELECT_UPCOMING_MOVIES)
                    .bind(timestamp)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Movie>(SELECT_ALL_MOVIES)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(movies)
    }

    async fn add_user(&self, username: &str) -> Result<(), StoreError> {
        sqlx::query(INSERT_USER)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn watch_movie(&self, username: &str, movie_id: i32) -> Result<(), StoreError> {
        sqlx::query(INSERT_WATCHED_MOVIE)
            .bind(username)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;
        info!(username, movie_id, "marked movie as watched");
        Ok(())
    }

    async fn get_watched_movies(&self, username: &str) -> Result<Vec<Movie>, StoreError> {
        let movies = sqlx::query_as::<_, Movie>(SELECT_WATCHED_MOVIES)
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }

    async fn search_movies(&self, term: &str) -> Result<Vec<Movie>, StoreError> {
        let movies = sqlx::query_as::<_, Movie>(SEARCH_MOVIES)
            .bind(term)
            .fetch_all(&self.pool)
            .await?;
        Ok(movies)
    }
}
