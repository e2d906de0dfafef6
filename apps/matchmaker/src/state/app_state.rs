use sea_orm::DatabaseConnection;

use crate::config::matchmaking::MatchmakingSettings;
use crate::services::{MatchmakingService, PlayerService};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub matchmaking: MatchmakingService,
    pub players: PlayerService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, settings: MatchmakingSettings) -> Self {
        Self {
            matchmaking: MatchmakingService::new(db.clone(), settings),
            players: PlayerService::new(db.clone(), settings.txn),
            db,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
