#![allow(dead_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use matchmaker::config::db::DbKind;
use matchmaker::config::matchmaking::MatchmakingSettings;
use matchmaker::domain::new_id;
use matchmaker::entities::players::PlayerStats;
use matchmaker::entities::{games, players};
use matchmaker::infra::state::build_state;
use matchmaker::{AppState, MatchmakingService, TxnRetryPolicy, WinnerSelector};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tempfile::TempDir;

/// Settings with short backoffs so conflict paths stay fast.
pub fn fast_settings(sample_size: u64) -> MatchmakingSettings {
    MatchmakingSettings {
        sample_size,
        txn: TxnRetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(10),
            deadline: Duration::from_secs(10),
        },
    }
}

/// Fresh, migrated in-memory database per call.
pub async fn test_state(sample_size: u64) -> AppState {
    build_state()
        .with_db(DbKind::SqliteMemory)
        .with_settings(fast_settings(sample_size))
        .build()
        .await
        .expect("build in-memory state")
}

/// Settings for a pooled file database, where transactions really overlap
/// and SQLite reports busy snapshots that have to be retried.
pub fn contended_settings(sample_size: u64) -> MatchmakingSettings {
    MatchmakingSettings {
        sample_size,
        txn: TxnRetryPolicy {
            max_attempts: 50,
            initial_backoff: Duration::from_millis(2),
            max_backoff: Duration::from_millis(50),
            deadline: Duration::from_secs(60),
        },
    }
}

/// Fresh, migrated SQLite file database with a multi-connection pool.
///
/// Points `SQLITE_DB_DIR` at a temporary directory, so callers must be
/// `#[serial]`. Keep the returned `TempDir` alive for the whole test.
pub async fn file_state(sample_size: u64) -> (TempDir, AppState) {
    let dir = tempfile::tempdir().expect("create temp dir");
    env::set_var("SQLITE_DB_DIR", dir.path());
    let state = build_state()
        .with_db(DbKind::SqliteFile)
        .with_settings(contended_settings(sample_size))
        .build()
        .await
        .expect("build file-backed state");
    (dir, state)
}

/// Insert idle players directly, bypassing the service layer.
pub async fn seed_players(state: &AppState, n: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(n);
    for _ in 0..n {
        ids.push(insert_player(state, Some(PlayerStats::default())).await);
    }
    ids
}

/// Insert one idle player with the given stats column.
pub async fn insert_player(state: &AppState, stats: Option<PlayerStats>) -> String {
    let id = new_id();
    players::ActiveModel {
        id: Set(id.clone()),
        player_name: Set(format!("player-{}", &id[..8])),
        email: Set(format!("{id}@example.test")),
        stats: Set(stats),
        current_game: Set(None),
        created_at: Set(time::OffsetDateTime::now_utc()),
    }
    .insert(state.db())
    .await
    .expect("insert player");
    id
}

pub async fn player(state: &AppState, id: &str) -> players::Model {
    players::Entity::find_by_id(id.to_string())
        .one(state.db())
        .await
        .expect("query player")
        .expect("player exists")
}

pub async fn game(state: &AppState, id: &str) -> games::Model {
    games::Entity::find_by_id(id.to_string())
        .one(state.db())
        .await
        .expect("query game")
        .expect("game exists")
}

pub async fn all_players(state: &AppState) -> Vec<players::Model> {
    players::Entity::find()
        .all(state.db())
        .await
        .expect("list players")
}

pub async fn all_games(state: &AppState) -> Vec<games::Model> {
    games::Entity::find()
        .all(state.db())
        .await
        .expect("list games")
}

/// Always picks the first roster member.
pub struct FirstPlayer;

impl WinnerSelector for FirstPlayer {
    fn select_winner(&self, roster: &[String]) -> Option<String> {
        roster.first().cloned()
    }
}

pub fn deterministic_service(state: &AppState) -> MatchmakingService {
    state
        .matchmaking
        .clone()
        .with_selector(Arc::new(FirstPlayer))
}
