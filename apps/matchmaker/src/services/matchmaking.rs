//! Matchmaking service: game creation and settlement.
//!
//! Each operation is a single `with_txn` call. Correctness under concurrency
//! rests on the store's transaction isolation plus the conditional updates in
//! the repos (`current_game IS NULL` when locking, `finished_at IS NULL` when
//! closing, `current_game = game` when releasing). There is no in-process lock.

use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction};
use tracing::{info, warn};

use crate::config::matchmaking::MatchmakingSettings;
use crate::db::txn::with_txn;
use crate::domain::ids::new_id;
use crate::domain::winner::{RandomWinner, WinnerSelector};
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, ValidationKind};
use crate::repos::{games, players};

/// Summary of one committed settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub game_id: String,
    pub winner_id: String,
    /// Roster members whose stats were updated and who were released.
    pub settled: Vec<String>,
    /// Roster members no longer locked to this game; left untouched.
    pub skipped: Vec<String>,
}

#[derive(Clone)]
pub struct MatchmakingService {
    db: DatabaseConnection,
    settings: MatchmakingSettings,
    selector: Arc<dyn WinnerSelector>,
}

impl MatchmakingService {
    /// Service with the uniform random winner policy.
    pub fn new(db: DatabaseConnection, settings: MatchmakingSettings) -> Self {
        Self {
            db,
            settings,
            selector: Arc::new(RandomWinner),
        }
    }

    /// Replace the winner policy.
    pub fn with_selector(mut self, selector: Arc<dyn WinnerSelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn settings(&self) -> &MatchmakingSettings {
        &self.settings
    }

    /// Create a game from a sample of idle players and lock them to it.
    ///
    /// An empty idle pool still produces a game, with an empty roster.
    /// A lock that misses any sampled player aborts the attempt; `with_txn`
    /// retries it with a fresh sample.
    pub async fn create_game(&self) -> Result<String, DomainError> {
        let game_id = new_id();
        let sample_size = self.settings.sample_size;

        let roster_size = with_txn(&self.db, &self.settings.txn, |txn| {
            let game_id = game_id.clone();
            Box::pin(async move { create_in_txn(txn, &game_id, sample_size).await })
        })
        .await?;

        info!(game_id = %game_id, roster_size, "game created");
        Ok(game_id)
    }

    /// Close an open game, pick its winner and settle every roster member.
    ///
    /// Fails with `NotFound` for an unknown id, `EmptyRoster` when nobody can
    /// be settled and `AlreadyClosed` when the game was settled before; none
    /// of those write anything.
    pub async fn close_game(&self, game_id: &str) -> Result<String, DomainError> {
        Ok(self.settle_game(game_id).await?.winner_id)
    }

    /// Like [`close_game`](Self::close_game) but returns the full settlement.
    pub async fn settle_game(&self, game_id: &str) -> Result<Settlement, DomainError> {
        if game_id.trim().is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InvalidGameId,
                "game id must not be empty",
            ));
        }

        let settlement = with_txn(&self.db, &self.settings.txn, |txn| {
            let game_id = game_id.to_string();
            let selector = Arc::clone(&self.selector);
            Box::pin(async move { settle_in_txn(txn, &game_id, selector.as_ref()).await })
        })
        .await?;

        info!(
            game_id = %settlement.game_id,
            winner_id = %settlement.winner_id,
            settled = settlement.settled.len(),
            skipped = settlement.skipped.len(),
            "game closed"
        );
        Ok(settlement)
    }
}

async fn create_in_txn(
    txn: &DatabaseTransaction,
    game_id: &str,
    sample_size: u64,
) -> Result<usize, DomainError> {
    let sampled = players::sample_idle_players(txn, sample_size).await?;
    games::create_game(txn, game_id, sampled.clone()).await?;

    let locked = players::lock_players(txn, game_id, &sampled).await?;
    if locked != sampled.len() as u64 {
        warn!(
            game_id,
            sampled = sampled.len(),
            locked,
            "sampled players were locked by a concurrent game"
        );
        return Err(DomainError::conflict(
            ConflictKind::PlayerLockRace,
            format!("locked {locked} of {} sampled players", sampled.len()),
        ));
    }

    Ok(sampled.len())
}

async fn settle_in_txn(
    txn: &DatabaseTransaction,
    game_id: &str,
    selector: &dyn WinnerSelector,
) -> Result<Settlement, DomainError> {
    let roster = games::read_open_game_roster(txn, game_id).await?;
    if roster.closed {
        return Err(already_closed(game_id));
    }

    let entries = players::read_roster_with_stats(txn, game_id, &roster.players).await?;
    if entries.is_empty() {
        return Err(DomainError::conflict(
            ConflictKind::EmptyRoster,
            format!("Game {game_id} has no players to settle"),
        ));
    }

    let candidates: Vec<String> = entries.iter().map(|e| e.player_id.clone()).collect();
    let winner_id = selector.select_winner(&candidates).ok_or_else(|| {
        DomainError::conflict(
            ConflictKind::EmptyRoster,
            format!("Game {game_id} has no players to settle"),
        )
    })?;
    if !candidates.contains(&winner_id) {
        return Err(DomainError::infra(
            InfraErrorKind::Other("WinnerSelector".into()),
            "winner policy returned a player outside the roster",
        ));
    }

    if games::close_game(txn, game_id, &winner_id).await? == 0 {
        return Err(already_closed(game_id));
    }

    let outcomes = players::apply_settlement(txn, game_id, &entries, &winner_id).await?;
    let (settled, skipped): (Vec<_>, Vec<_>) = outcomes.into_iter().partition(|o| o.applied);
    for outcome in &skipped {
        warn!(
            game_id,
            player_id = %outcome.player_id,
            "player no longer locked to this game; settlement skipped"
        );
    }

    Ok(Settlement {
        game_id: game_id.to_string(),
        winner_id,
        settled: settled.into_iter().map(|o| o.player_id).collect(),
        skipped: skipped.into_iter().map(|o| o.player_id).collect(),
    })
}

fn already_closed(game_id: &str) -> DomainError {
    DomainError::conflict(
        ConflictKind::AlreadyClosed,
        format!("Game {game_id} is already closed"),
    )
}
