// Poll store and poll menu behaviour, driven against the in-memory store.

use std::collections::HashMap;

use ballotbox::error::ShellError;
use ballotbox::handlers::Console;
use ballotbox::memory::MemoryPollStore;
use ballotbox::poll::{PollStore, Tally};
use ballotbox::routes;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Run the poll menu over `input` and return everything it printed.
async fn run_menu(store: &MemoryPollStore, input: &str) -> Result<String, ShellError> {
    let mut console = Console::new(input.as_bytes(), Vec::new());
    routes::run_polls(&mut console, store).await?;
    Ok(String::from_utf8(console.into_output()).unwrap())
}

fn options(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

/// Option ids of `poll_id` keyed by option text.
async fn option_ids(store: &MemoryPollStore, poll_id: i32) -> HashMap<String, i32> {
    store
        .get_poll_options(poll_id)
        .await
        .unwrap()
        .into_iter()
        .map(|o| (o.option_text, o.option_id))
        .collect()
}

// ===========================================================================
// Store
// ===========================================================================

#[tokio::test]
async fn created_poll_is_listed_once() {
    let store = MemoryPollStore::new();
    store
        .create_poll("Favourite colour", "alice", &options(&["Red", "Blue", "Green"]))
        .await
        .unwrap();

    let polls = store.list_polls().await.unwrap();
    let matching: Vec<_> = polls
        .iter()
        .filter(|p| p.title == "Favourite colour" && p.owner_username == "alice")
        .collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn poll_options_match_what_was_created() {
    let store = MemoryPollStore::new();
    let poll_id = store
        .create_poll("Lunch", "bob", &options(&["Pizza", "Sushi", "Tacos"]))
        .await
        .unwrap();

    let mut texts: Vec<String> = store
        .get_poll_options(poll_id)
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.option_text)
        .collect();
    texts.sort();
    assert_eq!(texts, ["Pizza", "Sushi", "Tacos"]);
}

#[tokio::test]
async fn unknown_poll_has_no_options() {
    let store = MemoryPollStore::new();
    assert!(store.get_poll_options(42).await.unwrap().is_empty());
}

#[tokio::test]
async fn poll_with_no_options_can_be_created() {
    let store = MemoryPollStore::new();
    let poll_id = store.create_poll("Empty", "carol", &[]).await.unwrap();

    assert_eq!(store.list_polls().await.unwrap().len(), 1);
    assert!(store.get_poll_options(poll_id).await.unwrap().is_empty());
    assert_eq!(store.get_tally(poll_id).await.unwrap(), Tally::NoVotes);
}

#[tokio::test]
async fn three_to_one_tally() {
    let store = MemoryPollStore::new();
    let poll_id = store
        .create_poll("A or B", "alice", &options(&["A", "B"]))
        .await
        .unwrap();
    let ids = option_ids(&store, poll_id).await;

    for voter in ["u1", "u2", "u3"] {
        store.cast_vote(voter, ids["A"]).await.unwrap();
    }
    store.cast_vote("u4", ids["B"]).await.unwrap();

    let Tally::Counted {
        total_votes,
        options,
    } = store.get_tally(poll_id).await.unwrap()
    else {
        panic!("expected counted tally");
    };
    assert_eq!(total_votes, 4);

    let by_text: HashMap<&str, (i64, f64)> = options
        .iter()
        .map(|o| (o.option_text.as_str(), (o.vote_count, o.vote_percentage)))
        .collect();
    assert_eq!(by_text["A"].0, 3);
    assert!((by_text["A"].1 - 75.0).abs() < 1e-9);
    assert_eq!(by_text["B"].0, 1);
    assert!((by_text["B"].1 - 25.0).abs() < 1e-9);
}

#[tokio::test]
async fn tally_counts_only_this_polls_votes() {
    let store = MemoryPollStore::new();
    let poll_id = store
        .create_poll("Seasons", "dave", &options(&["Spring", "Summer", "Autumn", "Winter"]))
        .await
        .unwrap();
    let other_id = store
        .create_poll("Other", "erin", &options(&["X"]))
        .await
        .unwrap();
    let ids = option_ids(&store, poll_id).await;
    let other = option_ids(&store, other_id).await;

    let ballots = [("Summer", 5), ("Winter", 2)];
    for (text, count) in ballots {
        for n in 0..count {
            store.cast_vote(&format!("voter{n}"), ids[text]).await.unwrap();
        }
    }
    store.cast_vote("outsider", other["X"]).await.unwrap();
    store.cast_vote("dangling", 9999).await.unwrap();

    let Tally::Counted {
        total_votes,
        options,
    } = store.get_tally(poll_id).await.unwrap()
    else {
        panic!("expected counted tally");
    };
    assert_eq!(total_votes, 7);
    assert_eq!(options.len(), 4);
    assert_eq!(options.iter().map(|o| o.vote_count).sum::<i64>(), 7);
    let percentages: f64 = options.iter().map(|o| o.vote_percentage).sum();
    assert!((percentages - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn zero_votes_yields_no_votes() {
    let store = MemoryPollStore::new();
    let poll_id = store
        .create_poll("Quiet", "frank", &options(&["Yes", "No"]))
        .await
        .unwrap();
    assert_eq!(store.get_tally(poll_id).await.unwrap(), Tally::NoVotes);
}

#[tokio::test]
async fn same_user_can_vote_repeatedly() {
    let store = MemoryPollStore::new();
    let poll_id = store
        .create_poll("Stuffing", "gina", &options(&["Only"]))
        .await
        .unwrap();
    let ids = option_ids(&store, poll_id).await;
    for _ in 0..3 {
        store.cast_vote("gina", ids["Only"]).await.unwrap();
    }

    let Tally::Counted { total_votes, .. } = store.get_tally(poll_id).await.unwrap() else {
        panic!("expected counted tally");
    };
    assert_eq!(total_votes, 3);
}

#[tokio::test]
async fn random_winner_is_roughly_uniform() {
    let store = MemoryPollStore::new();
    let poll_id = store
        .create_poll("Raffle", "host", &options(&["Enter"]))
        .await
        .unwrap();
    let option_id = option_ids(&store, poll_id).await["Enter"];
    let voters = ["ann", "ben", "cat", "dan", "eve"];
    for voter in voters {
        store.cast_vote(voter, option_id).await.unwrap();
    }

    const DRAWS: usize = 5000;
    let mut wins: HashMap<String, usize> = HashMap::new();
    for _ in 0..DRAWS {
        let winner = store
            .get_random_voter_for_option(option_id)
            .await
            .unwrap()
            .expect("option has votes");
        assert_eq!(winner.option_id, option_id);
        *wins.entry(winner.username).or_default() += 1;
    }

    // Expected 1000 each; the standard deviation is about 28.
    assert_eq!(wins.len(), voters.len());
    for voter in voters {
        let count = wins[voter];
        assert!((800..=1200).contains(&count), "{voter} won {count} times");
    }
}

#[tokio::test]
async fn random_winner_without_votes_is_none() {
    let store = MemoryPollStore::new();
    let poll_id = store
        .create_poll("Nobody", "host", &options(&["Lonely"]))
        .await
        .unwrap();
    let option_id = option_ids(&store, poll_id).await["Lonely"];
    assert!(store
        .get_random_voter_for_option(option_id)
        .await
        .unwrap()
        .is_none());
}

// ===========================================================================
// Menu
// ===========================================================================

#[tokio::test]
async fn menu_creates_and_lists_a_poll() {
    let store = MemoryPollStore::new();
    let output = run_menu(&store, "1\nColours\nalice\nRed\nBlue\nGreen\n\n2\n7\n")
        .await
        .unwrap();

    assert!(output.contains("Created poll 1 with 3 options."));
    assert_eq!(output.matches("1: Colours (created by alice)").count(), 1);
    assert_eq!(store.get_poll_options(1).await.unwrap().len(), 3);
}

#[tokio::test]
async fn menu_vote_and_show_results() {
    let store = MemoryPollStore::new();
    store
        .create_poll("A or B", "alice", &options(&["A", "B"]))
        .await
        .unwrap();

    let input = "3\n1\n1\nu1\n3\n1\n1\nu2\n3\n1\n1\nu3\n3\n1\n2\nu4\n4\n1\n7\n";
    let output = run_menu(&store, input).await.unwrap();

    assert!(output.contains("1: A\n2: B\n"));
    assert!(output.contains("A got 3 votes (75.00% of total)"));
    assert!(output.contains("B got 1 votes (25.00% of total)"));
}

#[tokio::test]
async fn menu_reports_no_votes_instead_of_failing() {
    let store = MemoryPollStore::new();
    store
        .create_poll("Quiet", "frank", &options(&["Yes", "No"]))
        .await
        .unwrap();

    let output = run_menu(&store, "4\n1\n7\n").await.unwrap();
    assert!(output.contains("No votes yet cast for this poll."));
}

#[tokio::test]
async fn menu_picks_a_winner_among_voters() {
    let store = MemoryPollStore::new();
    store
        .create_poll("Raffle", "host", &options(&["Enter", "Skip"]))
        .await
        .unwrap();
    store.cast_vote("ann", 1).await.unwrap();

    let output = run_menu(&store, "5\n1\n1\n5\n1\n2\n7\n").await.unwrap();
    assert!(output.contains("The randomly selected winner is ann."));
    assert!(output.contains("Nobody has voted for that option yet."));
}

#[tokio::test]
async fn menu_shows_latest_poll() {
    let store = MemoryPollStore::new();
    let output = run_menu(&store, "6\n7\n").await.unwrap();
    assert!(output.contains("There are no polls with options yet."));

    store
        .create_poll("Old", "alice", &options(&["a"]))
        .await
        .unwrap();
    store
        .create_poll("New", "bob", &options(&["b", "c"]))
        .await
        .unwrap();
    let output = run_menu(&store, "6\n7\n").await.unwrap();
    assert!(output.contains("Latest poll: New (created by bob)"));
    assert!(output.contains("2: b\n3: c\n"));
}

#[tokio::test]
async fn unknown_selection_keeps_the_loop_going() {
    let store = MemoryPollStore::new();
    let output = run_menu(&store, "9\nhello\n2\n7\n").await.unwrap();
    assert_eq!(output.matches("Invalid input, please try again!").count(), 2);
}

#[tokio::test]
async fn end_of_input_ends_the_session_cleanly() {
    let store = MemoryPollStore::new();
    run_menu(&store, "2\n").await.unwrap();
}

#[tokio::test]
async fn input_ending_inside_create_poll_writes_nothing() {
    let store = MemoryPollStore::new();
    let err = run_menu(&store, "1\n").await.unwrap_err();
    assert!(matches!(err, ShellError::UnexpectedEof));
    assert!(store.list_polls().await.unwrap().is_empty());

    let err = run_menu(&store, "1\nColours\nalice\nRed\n").await.unwrap_err();
    assert!(matches!(err, ShellError::UnexpectedEof));
    assert!(store.list_polls().await.unwrap().is_empty());
}

#[tokio::test]
async fn input_ending_before_the_username_casts_no_vote() {
    let store = MemoryPollStore::new();
    let poll_id = store
        .create_poll("A or B", "alice", &options(&["A", "B"]))
        .await
        .unwrap();

    let err = run_menu(&store, "3\n1\n1\n").await.unwrap_err();
    assert!(matches!(err, ShellError::UnexpectedEof));
    assert_eq!(store.get_tally(poll_id).await.unwrap(), Tally::NoVotes);
}

#[tokio::test]
async fn non_numeric_poll_id_ends_the_session() {
    let store = MemoryPollStore::new();
    let err = run_menu(&store, "3\nfirst\n7\n").await.unwrap_err();
    assert!(matches!(err, ShellError::InvalidNumber { ref input, .. } if input == "first"));
}
