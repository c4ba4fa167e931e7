// routes.rs
use std::io::{BufRead, Write};

use tracing::warn;

use crate::error::ShellError;
use crate::handlers::{self, Console};
use crate::poll::PollStore;
use crate::watchlist::WatchlistStore;

const POLL_MENU: &str = "-- Menu --
1) Create new poll
2) List open polls
3) Vote on a poll
4) Show poll votes
5) Select a random winner from a poll option
6) Show latest poll
7) Exit

Enter your choice: ";

const WATCHLIST_MENU: &str = "Please select one of the following options:
1) Add new movie.
2) View upcoming movies.
3) View all movies
4) Watch a movie
5) View watched movies.
6) Add user to the app.
7) Search for a movie.
8) Exit

Your selection: ";

const INVALID_SELECTION: &str = "Invalid input, please try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollAction {
    CreatePoll,
    ListPolls,
    Vote,
    ShowVotes,
    RandomWinner,
    LatestPoll,
    Exit,
}

impl PollAction {
    pub fn from_selection(selection: &str) -> Option<Self> {
        match selection.trim() {
            "1" => Some(Self::CreatePoll),
            "2" => Some(Self::ListPolls),
            "3" => Some(Self::Vote),
            "4" => Some(Self::ShowVotes),
            "5" => Some(Self::RandomWinner),
            "6" => Some(Self::LatestPoll),
            "7" => Some(Self::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistAction {
    AddMovie,
    UpcomingMovies,
    AllMovies,
    WatchMovie,
    WatchedMovies,
    AddUser,
    SearchMovies,
    Exit,
}

impl WatchlistAction {
    pub fn from_selection(selection: &str) -> Option<Self> {
        match selection.trim() {
            "1" => Some(Self::AddMovie),
            "2" => Some(Self::UpcomingMovies),
            "3" => Some(Self::AllMovies),
            "4" => Some(Self::WatchMovie),
            "5" => Some(Self::WatchedMovies),
            "6" => Some(Self::AddUser),
            "7" => Some(Self::SearchMovies),
            "8" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Run the poll menu until the exit selection or end of input.
pub async fn run_polls<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn PollStore,
) -> Result<(), ShellError> {
    loop {
        let Some(selection) = console.prompt_selection(POLL_MENU)? else {
            return Ok(());
        };
        match PollAction::from_selection(&selection) {
            Some(PollAction::CreatePoll) => handlers::create_poll(console, store).await?,
            Some(PollAction::ListPolls) => handlers::list_polls(console, store).await?,
            Some(PollAction::Vote) => handlers::vote(console, store).await?,
            Some(PollAction::ShowVotes) => handlers::show_poll_votes(console, store).await?,
            Some(PollAction::RandomWinner) => {
                handlers::randomize_poll_winner(console, store).await?
            }
            Some(PollAction::LatestPoll) => handlers::show_latest_poll(console, store).await?,
            Some(PollAction::Exit) => return Ok(()),
            None => {
                warn!(selection = %selection, "unknown poll menu selection");
                console.say(INVALID_SELECTION)?;
            }
        }
    }
}

/// Run the watchlist menu until the exit selection or end of input.
pub async fn run_watchlist<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn WatchlistStore,
) -> Result<(), ShellError> {
    console.say("Welcome to the watchlist app!")?;
    loop {
        let Some(selection) = console.prompt_selection(WATCHLIST_MENU)? else {
            return Ok(());
        };
        match WatchlistAction::from_selection(&selection) {
            Some(WatchlistAction::AddMovie) => handlers::add_movie(console, store).await?,
            Some(WatchlistAction::UpcomingMovies) => {
                handlers::list_movies(console, store, true).await?
            }
            Some(WatchlistAction::AllMovies) => handlers::list_movies(console, store, false).await?,
            Some(WatchlistAction::WatchMovie) => handlers::watch_movie(console, store).await?,
            Some(WatchlistAction::WatchedMovies) => {
                handlers::show_watched_movies(console, store).await?
            }
            Some(WatchlistAction::AddUser) => handlers::add_user(console, store).await?,
            Some(WatchlistAction::SearchMovies) => handlers::search_movies(console, store).await?,
            Some(WatchlistAction::Exit) => return Ok(()),
            None => {
                warn!(selection = %selection, "unknown watchlist menu selection");
                console.say(INVALID_SELECTION)?;
            }
        }
    }
}
