//! Player pool repository functions for domain layer.

use std::collections::HashMap;

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::adapters::players_sea::{self as players_adapter, PlayerCreate, PlayerSettle};
use crate::entities::players::{self, PlayerStats};
use crate::errors::domain::DomainError;

/// Player domain model. Missing stats read as zero counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    pub player_name: String,
    pub email: String,
    pub stats: PlayerStats,
    pub current_game: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<players::Model> for Player {
    fn from(model: players::Model) -> Self {
        Self {
            id: model.id,
            player_name: model.player_name,
            email: model.email,
            stats: model.stats.unwrap_or_default(),
            current_game: model.current_game,
            created_at: model.created_at,
        }
    }
}

/// One roster member as seen at settlement time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub player_id: String,
    pub stats: PlayerStats,
}

/// Result of settling one roster member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub player_id: String,
    /// False when the player was no longer locked to the game.
    pub applied: bool,
}

/// Sample up to `n` idle players. May return fewer, including none.
pub async fn sample_idle_players<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    n: u64,
) -> Result<Vec<String>, DomainError> {
    let ids = players_adapter::sample_idle_ids(conn, n).await?;
    debug!(requested = n, sampled = ids.len(), "sampled idle players");
    Ok(ids)
}

/// Lock the given players to `game_id` if they are still idle.
///
/// Returns how many rows were actually locked.
pub async fn lock_players<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    player_ids: &[String],
) -> Result<u64, DomainError> {
    Ok(players_adapter::lock_idle(conn, game_id, player_ids).await?)
}

/// Stats for every roster member, in roster order.
///
/// Members without a player row are skipped with a warning; NULL stats
/// become `{0, 0}`.
pub async fn read_roster_with_stats<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    roster: &[String],
) -> Result<Vec<RosterEntry>, DomainError> {
    let mut by_id: HashMap<String, Option<PlayerStats>> =
        players_adapter::find_by_ids(conn, roster)
            .await?
            .into_iter()
            .map(|p| (p.id, p.stats))
            .collect();

    let mut entries = Vec::with_capacity(roster.len());
    for player_id in roster {
        match by_id.remove(player_id) {
            Some(stats) => entries.push(RosterEntry {
                player_id: player_id.clone(),
                stats: stats.unwrap_or_default(),
            }),
            None => warn!(game_id, player_id = %player_id, "roster member has no player row"),
        }
    }
    Ok(entries)
}

/// Increment counters and release every roster member still locked to `game_id`.
pub async fn apply_settlement<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    roster: &[RosterEntry],
    winner_id: &str,
) -> Result<Vec<SettlementOutcome>, DomainError> {
    let mut outcomes = Vec::with_capacity(roster.len());
    for entry in roster {
        let applied = players_adapter::settle_player(
            conn,
            PlayerSettle {
                player_id: entry.player_id.clone(),
                game_id: game_id.to_string(),
                stats: entry.stats.settled(entry.player_id == winner_id),
            },
        )
        .await?;
        outcomes.push(SettlementOutcome {
            player_id: entry.player_id.clone(),
            applied,
        });
    }
    Ok(outcomes)
}

/// Insert a new idle player with zero counters.
pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: &str,
    player_name: &str,
    email: &str,
) -> Result<Player, DomainError> {
    let model = players_adapter::create_player(
        conn,
        PlayerCreate::new(player_id, player_name, email),
    )
    .await?;
    Ok(Player::from(model))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: &str,
) -> Result<Option<Player>, DomainError> {
    let player = players_adapter::find_by_id(conn, player_id).await?;
    Ok(player.map(Player::from))
}

pub async fn list_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<String>, DomainError> {
    Ok(players_adapter::list_ids(conn, limit).await?)
}
