//! Concurrent callers against one shared database.
//!
//! Each scenario runs twice: on the single-connection in-memory pool, and on
//! a pooled SQLite file where transactions overlap for real.

mod common;
mod support;

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use matchmaker::config::matchmaking::MatchmakingSettings;
use matchmaker::errors::domain::{ConflictKind, DomainError};
use matchmaker::{AppState, MatchmakingService, TxnRetryPolicy};
use sea_orm::ConnectionTrait;
use serial_test::serial;
use support::{all_games, all_players, file_state, seed_players, test_state};

// Makes every lock update skip its row, so `lock_players` comes up short.
const HOLD_LOCKS: &str = "CREATE TRIGGER hold_locks BEFORE UPDATE OF current_game ON players \
     WHEN NEW.current_game IS NOT NULL BEGIN SELECT RAISE(IGNORE); END;";
const RELEASE_LOCKS: &str = "DROP TRIGGER hold_locks;";

async fn creates_never_double_lock(state: &AppState) {
    seed_players(state, 30).await;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let service = state.matchmaking.clone();
            tokio::spawn(async move { service.create_game().await })
        })
        .collect();

    let mut created = Vec::new();
    for handle in join_all(handles).await {
        created.push(handle.unwrap().unwrap());
    }
    assert_eq!(created.len(), 10);

    // player -> games whose open roster lists them
    let mut seen: HashMap<String, Vec<String>> = HashMap::new();
    for g in all_games(state).await {
        assert!(g.finished_at.is_none());
        for member in g.players.0 {
            seen.entry(member).or_default().push(g.id.clone());
        }
    }
    for (member, in_games) in &seen {
        assert_eq!(in_games.len(), 1, "{member} is in {in_games:?}");
    }

    // current_game agrees with the rosters, and the pool is fully consumed.
    let players = all_players(state).await;
    for p in &players {
        let listed = seen.get(&p.id).map(|games| games[0].as_str());
        assert_eq!(p.current_game.as_deref(), listed, "player {}", p.id);
    }
    assert_eq!(seen.len(), 30);
}

async fn closes_settle_exactly_once(state: &AppState, callers: usize) {
    seed_players(state, 4).await;
    let game_id = state.matchmaking.create_game().await.unwrap();

    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let service = state.matchmaking.clone();
            let game_id = game_id.clone();
            tokio::spawn(async move { service.close_game(&game_id).await })
        })
        .collect();

    let mut winners = Vec::new();
    let mut already_closed = 0;
    for handle in join_all(handles).await {
        match handle.unwrap() {
            Ok(winner) => winners.push(winner),
            Err(DomainError::Conflict(ConflictKind::AlreadyClosed, _)) => already_closed += 1,
            Err(other) => panic!("unexpected close error: {other:?}"),
        }
    }
    assert_eq!(winners.len(), 1);
    assert_eq!(already_closed, callers - 1);

    for p in all_players(state).await {
        let stats = p.stats.unwrap_or_default();
        assert_eq!(stats.games_played, 1, "player {} settled twice", p.id);
        assert_eq!(stats.games_won, u32::from(p.id == winners[0]));
        assert!(p.current_game.is_none());
    }
}

async fn interleaved_create_and_close(state: &AppState) {
    seed_players(state, 12).await;

    let first_round: Vec<String> = join_all((0..4).map(|_| {
        let service = state.matchmaking.clone();
        async move { service.create_game().await.unwrap() }
    }))
    .await;

    let mut tasks = Vec::new();
    for game_id in first_round.iter().take(2).cloned() {
        let service = state.matchmaking.clone();
        tasks.push(tokio::spawn(async move {
            service.close_game(&game_id).await.map(|_| ())
        }));
    }
    for _ in 0..2 {
        let service = state.matchmaking.clone();
        tasks.push(tokio::spawn(async move {
            service.create_game().await.map(|_| ())
        }));
    }
    for result in join_all(tasks).await {
        result.unwrap().unwrap();
    }

    let games = all_games(state).await;
    let mut open_member_of: HashMap<String, String> = HashMap::new();
    for g in games.iter().filter(|g| g.finished_at.is_none()) {
        for member in &g.players.0 {
            let previous = open_member_of.insert(member.clone(), g.id.clone());
            assert!(previous.is_none(), "{member} in two open games");
        }
    }
    for p in all_players(state).await {
        assert_eq!(
            p.current_game.as_ref(),
            open_member_of.get(&p.id),
            "player {}",
            p.id
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_never_double_lock() {
    let state = test_state(5).await;
    creates_never_double_lock(&state).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn concurrent_creates_never_double_lock_on_pooled_file() {
    let (_dir, state) = file_state(5).await;
    creates_never_double_lock(&state).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_closes_settle_exactly_once() {
    let state = test_state(100).await;
    closes_settle_exactly_once(&state, 8).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn concurrent_closes_settle_exactly_once_on_pooled_file() {
    let (_dir, state) = file_state(100).await;
    closes_settle_exactly_once(&state, 6).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_create_and_close_keep_locks_consistent() {
    let state = test_state(3).await;
    interleaved_create_and_close(&state).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn interleaved_create_and_close_keep_locks_consistent_on_pooled_file() {
    let (_dir, state) = file_state(3).await;
    interleaved_create_and_close(&state).await;
}

#[tokio::test]
async fn lock_shortfall_exhausts_retries_and_leaves_nothing_behind() {
    let state = test_state(100).await;
    seed_players(&state, 3).await;
    state.db().execute_unprepared(HOLD_LOCKS).await.unwrap();

    let err = state.matchmaking.create_game().await.unwrap_err();
    assert!(
        matches!(err, DomainError::Conflict(ConflictKind::RetryExhausted, _)),
        "got {err:?}"
    );
    assert!(all_games(&state).await.is_empty());
    assert!(all_players(&state)
        .await
        .iter()
        .all(|p| p.current_game.is_none()));

    state.db().execute_unprepared(RELEASE_LOCKS).await.unwrap();
    let game_id = state.matchmaking.create_game().await.unwrap();
    for p in all_players(&state).await {
        assert_eq!(p.current_game.as_deref(), Some(game_id.as_str()));
    }
}

#[tokio::test]
async fn lock_shortfall_is_retried_until_the_lock_succeeds() {
    let state = test_state(100).await;
    seed_players(&state, 3).await;
    state.db().execute_unprepared(HOLD_LOCKS).await.unwrap();

    let patient = MatchmakingSettings {
        sample_size: 100,
        txn: TxnRetryPolicy {
            max_attempts: 500,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(10),
            deadline: Duration::from_secs(10),
        },
    };
    let service = MatchmakingService::new(state.db().clone(), patient);
    let create = tokio::spawn(async move { service.create_game().await });

    // Let a few attempts fail before the locks start sticking.
    tokio::time::sleep(Duration::from_millis(40)).await;
    state.db().execute_unprepared(RELEASE_LOCKS).await.unwrap();

    let game_id = create.await.unwrap().unwrap();
    let games = all_games(&state).await;
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, game_id);
    assert_eq!(games[0].players.len(), 3);
    for p in all_players(&state).await {
        assert_eq!(p.current_game.as_deref(), Some(game_id.as_str()));
    }
}
