//! DTOs for games_sea adapter.

use time::OffsetDateTime;

/// DTO for inserting a new, open game.
#[derive(Debug, Clone)]
pub struct GameCreate {
    pub id: String,
    pub players: Vec<String>,
    pub created_at: OffsetDateTime,
}

impl GameCreate {
    pub fn new(id: impl Into<String>, players: Vec<String>) -> Self {
        Self {
            id: id.into(),
            players,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// DTO for the guarded close of an open game.
#[derive(Debug, Clone)]
pub struct GameClose {
    pub id: String,
    pub winner: String,
    pub finished_at: OffsetDateTime,
}

impl GameClose {
    pub fn new(id: impl Into<String>, winner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            winner: winner.into(),
            finished_at: OffsetDateTime::now_utc(),
        }
    }
}
