//! DTOs for players_sea adapter.

use time::OffsetDateTime;

use crate::entities::players::PlayerStats;

/// DTO for registering a player profile.
#[derive(Debug, Clone)]
pub struct PlayerCreate {
    pub id: String,
    pub player_name: String,
    pub email: String,
    pub created_at: OffsetDateTime,
}

impl PlayerCreate {
    pub fn new(
        id: impl Into<String>,
        player_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            player_name: player_name.into(),
            email: email.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// New counters for one roster player, guarded on the game they are locked to.
#[derive(Debug, Clone)]
pub struct PlayerSettle {
    pub player_id: String,
    pub game_id: String,
    pub stats: PlayerStats,
}
