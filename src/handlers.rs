// handlers.rs
use std::io::{BufRead, Write};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::error::ShellError;
use crate::models::{Movie, PollOption};
use crate::poll::{PollStore, Tally};
use crate::watchlist::WatchlistStore;

const NEW_OPTION_PROMPT: &str = "Enter new option text (or leave empty to stop adding options): ";
const RELEASE_DATE_FORMAT: &str = "%d-%m-%Y";
const DISPLAY_DATE_FORMAT: &str = "%b %d %Y";

/// Line-oriented prompt/response over any reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `message` without a newline and read one line of input, with the
    /// line terminator stripped. End of input is an error.
    pub fn prompt(&mut self, message: &str) -> Result<String, ShellError> {
        self.read_answer(message)?.ok_or(ShellError::UnexpectedEof)
    }

    /// Prompt for a menu selection. `None` means the input ended, which the
    /// menu loops treat like the exit selection.
    pub fn prompt_selection(&mut self, message: &str) -> Result<Option<String>, ShellError> {
        self.read_answer(message)
    }

    fn read_answer(&mut self, message: &str) -> Result<Option<String>, ShellError> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Prompt for an integer id. Anything that does not parse is an error
    /// that ends the session.
    pub fn prompt_number(&mut self, message: &str) -> Result<i32, ShellError> {
        let input = self.prompt(message)?;
        input
            .trim()
            .parse()
            .map_err(|source| ShellError::InvalidNumber { input, source })
    }

    pub fn say(&mut self, line: impl AsRef<str>) -> Result<(), ShellError> {
        writeln!(self.output, "{}", line.as_ref())?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

// ---------------------------------------------------------------------------
// Polls
// ---------------------------------------------------------------------------

pub async fn create_poll<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn PollStore,
) -> Result<(), ShellError> {
    let title = console.prompt("Enter poll title: ")?;
    let owner = console.prompt("Enter poll owner: ")?;

    let mut options = Vec::new();
    loop {
        let option = console.prompt(NEW_OPTION_PROMPT)?;
        if option.is_empty() {
            break;
        }
        options.push(option);
    }

    let poll_id = store.create_poll(&title, &owner, &options).await?;
    console.say(format!("Created poll {poll_id} with {} options.", options.len()))
}

pub async fn list_polls<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn PollStore,
) -> Result<(), ShellError> {
    for poll in store.list_polls().await? {
        console.say(format!(
            "{}: {} (created by {})",
            poll.id, poll.title, poll.owner_username
        ))?;
    }
    Ok(())
}

pub async fn vote<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn PollStore,
) -> Result<(), ShellError> {
    let poll_id = console.prompt_number("Enter poll would you like to vote on: ")?;
    let options = store.get_poll_options(poll_id).await?;
    print_poll_options(console, &options)?;

    let option_id = console.prompt_number("Enter option you'd like to vote for: ")?;
    let username = console.prompt("Enter the username you'd like to vote as: ")?;
    store.cast_vote(&username, option_id).await?;
    Ok(())
}

pub async fn show_poll_votes<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn PollStore,
) -> Result<(), ShellError> {
    let poll_id = console.prompt_number("Enter poll you would like to see votes for: ")?;
    match store.get_tally(poll_id).await? {
        Tally::NoVotes => console.say("No votes yet cast for this poll."),
        Tally::Counted { options, .. } => {
            for option in options {
                console.say(format!(
                    "{} got {} votes ({:.2}% of total)",
                    option.option_text, option.vote_count, option.vote_percentage
                ))?;
            }
            Ok(())
        }
    }
}

pub async fn randomize_poll_winner<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn PollStore,
) -> Result<(), ShellError> {
    let poll_id = console.prompt_number("Enter poll you'd like to pick a winner for: ")?;
    let options = store.get_poll_options(poll_id).await?;
    print_poll_options(console, &options)?;

    let option_id = console.prompt_number(
        "Enter which is the winning option, we'll pick a random winner from voters: ",
    )?;
    match store.get_random_voter_for_option(option_id).await? {
        Some(winner) => console.say(format!(
            "The randomly selected winner is {}.",
            winner.username
        )),
        None => console.say("Nobody has voted for that option yet."),
    }
}

pub async fn show_latest_poll<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn PollStore,
) -> Result<(), ShellError> {
    let options = store.get_latest_poll().await?;
    match options.first() {
        Some(first) => {
            console.say(format!(
                "Latest poll: {} (created by {})",
                first.title, first.owner_username
            ))?;
            print_poll_options(console, &options)
        }
        None => console.say("There are no polls with options yet."),
    }
}

fn print_poll_options<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    options: &[PollOption],
) -> Result<(), ShellError> {
    for option in options {
        console.say(format!("{}: {}", option.option_id, option.option_text))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Watchlist
// ---------------------------------------------------------------------------

/// Parse a `dd-mm-YYYY` release date into seconds since the epoch (midnight
/// UTC).
pub fn parse_release_date(input: &str) -> Result<i64, ShellError> {
    let date = NaiveDate::parse_from_str(input.trim(), RELEASE_DATE_FORMAT).map_err(|source| {
        ShellError::InvalidDate {
            input: input.to_string(),
            source,
        }
    })?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
}

pub fn format_release_date(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

pub async fn add_movie<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn WatchlistStore,
) -> Result<(), ShellError> {
    let title = console.prompt("Movie title: ")?;
    let release_date = console.prompt("Release date (dd-mm-YYYY): ")?;
    let timestamp = parse_release_date(&release_date)?;
    store.add_movie(&title, timestamp).await?;
    Ok(())
}

pub async fn list_movies<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn WatchlistStore,
    upcoming_only: bool,
) -> Result<(), ShellError> {
    let (heading, released_after) = if upcoming_only {
        ("Upcoming", Some(Utc::now().timestamp()))
    } else {
        ("All", None)
    };
    let movies = store.get_movies(released_after).await?;
    print_movie_list(console, heading, &movies)
}

pub async fn watch_movie<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn WatchlistStore,
) -> Result<(), ShellError> {
    let username = console.prompt("Username: ")?;
    let movie_id = console.prompt_number("Movie ID: ")?;
    store.watch_movie(&username, movie_id).await?;
    Ok(())
}

pub async fn show_watched_movies<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn WatchlistStore,
) -> Result<(), ShellError> {
    let username = console.prompt("Username: ")?;
    let movies = store.get_watched_movies(&username).await?;
    if movies.is_empty() {
        console.say("That user has no watched movies.")
    } else {
        print_movie_list(console, &format!("{username}'s watched"), &movies)
    }
}

pub async fn add_user<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn WatchlistStore,
) -> Result<(), ShellError> {
    let username = console.prompt("Username: ")?;
    store.add_user(&username).await?;
    Ok(())
}

pub async fn search_movies<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    store: &dyn WatchlistStore,
) -> Result<(), ShellError> {
    let term = console.prompt("Enter partial movie title: ")?;
    let movies = store.search_movies(&term).await?;
    debug!(term = %term, found = movies.len(), "movie search");
    if movies.is_empty() {
        console.say("Found no movies for that search term!")
    } else {
        print_movie_list(console, "Movies found", &movies)
    }
}

fn print_movie_list<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    heading: &str,
    movies: &[Movie],
) -> Result<(), ShellError> {
    console.say(format!("-- {heading} movies --"))?;
    for movie in movies {
        console.say(format!(
            "{}: {} (on {})",
            movie.id,
            movie.title,
            format_release_date(movie.release_timestamp)
        ))?;
    }
    console.say("---\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_dates_round_trip_through_display_format() {
        let timestamp = parse_release_date("25-12-2030").unwrap();
        assert_eq!(format_release_date(timestamp), "Dec 25 2030");
    }

    #[test]
    fn malformed_release_date_is_rejected() {
        let err = parse_release_date("2030/12/25").unwrap_err();
        assert!(matches!(err, ShellError::InvalidDate { .. }));
    }

    #[test]
    fn prompt_strips_line_endings_and_fails_at_eof() {
        let mut console = Console::new("Alice\r\n\n".as_bytes(), Vec::new());
        assert_eq!(console.prompt("Name: ").unwrap(), "Alice");
        assert_eq!(console.prompt("Name: ").unwrap(), "");
        let err = console.prompt("Name: ").unwrap_err();
        assert!(matches!(err, ShellError::UnexpectedEof));
        assert_eq!(console.into_output(), b"Name: Name: Name: ");
    }

    #[test]
    fn selection_prompt_reports_eof_as_none() {
        let mut console = Console::new("3\n".as_bytes(), Vec::new());
        assert_eq!(console.prompt_selection("> ").unwrap().as_deref(), Some("3"));
        assert_eq!(console.prompt_selection("> ").unwrap(), None);
    }

    #[test]
    fn non_numeric_id_is_an_error() {
        let mut console = Console::new("seven\n".as_bytes(), Vec::new());
        let err = console.prompt_number("Poll: ").unwrap_err();
        assert!(matches!(err, ShellError::InvalidNumber { ref input, .. } if input == "seven"));
    }
}
