use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Per-player counters, stored as a JSON object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PlayerStats {
    #[serde(default)]
    pub games_played: u32,
    #[serde(default)]
    pub games_won: u32,
}

impl PlayerStats {
    /// Counters after one more finished game.
    pub fn settled(self, won: bool) -> Self {
        Self {
            games_played: self.games_played.saturating_add(1),
            games_won: if won {
                self.games_won.saturating_add(1)
            } else {
                self.games_won
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_name = "player_name")]
    pub player_name: String,
    #[sea_orm(unique)]
    pub email: String,
    /// NULL for rows written before stats existed.
    pub stats: Option<PlayerStats>,
    /// NULL while the player is idle.
    #[sea_orm(column_name = "current_game")]
    pub current_game: Option<String>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
