use db_infra::config::db::{DbKind, RuntimeEnv};

use crate::config::matchmaking::MatchmakingSettings;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    env: RuntimeEnv,
    db_kind: Option<DbKind>,
    settings: MatchmakingSettings,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            env: RuntimeEnv::Test,
            db_kind: None,
            settings: MatchmakingSettings::default(),
        }
    }

    pub fn with_env(mut self, env: RuntimeEnv) -> Self {
        self.env = env;
        self
    }

    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.db_kind = Some(kind);
        self
    }

    pub fn with_settings(mut self, settings: MatchmakingSettings) -> Self {
        self.settings = settings;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        self.settings.validate()?;
        let kind = self
            .db_kind
            .ok_or_else(|| AppError::config("no database configured for the application state"))?;

        // single entrypoint: connect + migrate
        let conn = bootstrap_db(self.env, kind).await?;
        Ok(AppState::new(conn, self.settings))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
