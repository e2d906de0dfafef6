//! Game repository functions for domain layer.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::debug;

use crate::adapters::games_sea::{self as games_adapter, GameClose, GameCreate};
use crate::entities::games;
use crate::errors::domain::{DomainError, NotFoundKind};

/// Game domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: String,
    /// Fixed at creation, in sampling order.
    pub players: Vec<String>,
    pub winner: Option<String>,
    pub created_at: OffsetDateTime,
    pub finished_at: Option<OffsetDateTime>,
}

impl Game {
    pub fn is_open(&self) -> bool {
        self.finished_at.is_none()
    }
}

impl From<games::Model> for Game {
    fn from(model: games::Model) -> Self {
        Self {
            id: model.id,
            players: model.players.0,
            winner: model.winner,
            created_at: model.created_at,
            finished_at: model.finished_at,
        }
    }
}

/// Roster of a game plus whether it has already been settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRoster {
    pub game_id: String,
    pub players: Vec<String>,
    pub closed: bool,
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Option<Game>, DomainError> {
    let game = games_adapter::find_by_id(conn, game_id).await?;
    Ok(game.map(Game::from))
}

/// Insert an open game with the given roster.
///
/// Fails with `Conflict(DuplicateGameId)` if the id is taken.
pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    player_ids: Vec<String>,
) -> Result<Game, DomainError> {
    let model = games_adapter::create_game(conn, GameCreate::new(game_id, player_ids)).await?;
    debug!(game_id = %model.id, roster_size = model.players.len(), "game row inserted");
    Ok(Game::from(model))
}

/// Read a game's roster; `NotFound(Game)` when the id is unknown.
pub async fn read_open_game_roster<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<GameRoster, DomainError> {
    let game = games_adapter::find_by_id(conn, game_id)
        .await?
        .ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Game, format!("Game {game_id} not found"))
        })?;

    Ok(GameRoster {
        closed: game.finished_at.is_some(),
        game_id: game.id,
        players: game.players.0,
    })
}

/// Record the winner and finish time, guarded on the game still being open.
///
/// Returns the number of rows updated (0 or 1).
pub async fn close_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    winner_id: &str,
) -> Result<u64, DomainError> {
    let rows = games_adapter::close_open_game(conn, GameClose::new(game_id, winner_id)).await?;
    Ok(rows)
}
