//! Player profile service.

use std::sync::LazyLock;

use regex::Regex;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::db::txn::{with_txn, TxnRetryPolicy};
use crate::domain::ids::new_id;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::players::{self, Player};

/// Upper bound on ids returned by [`PlayerService::list_player_ids`].
pub const MAX_LISTED_PLAYERS: u64 = 10_000;

const MAX_NAME_LEN: usize = 64;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$").unwrap()
    });
    &EMAIL_REGEX
}

#[derive(Clone)]
pub struct PlayerService {
    db: DatabaseConnection,
    txn: TxnRetryPolicy,
}

impl PlayerService {
    pub fn new(db: DatabaseConnection, txn: TxnRetryPolicy) -> Self {
        Self { db, txn }
    }

    /// Register an idle player with zero counters and return its id.
    ///
    /// The name is trimmed and must be non-empty; the e-mail is trimmed,
    /// lowercased and must look like an address. A taken e-mail fails with
    /// `Conflict(UniqueEmail)`.
    pub async fn create_player(&self, player_name: &str, email: &str) -> Result<String, DomainError> {
        let player_name = normalize_name(player_name)?;
        let email = normalize_email(email)?;
        let player_id = new_id();

        with_txn(&self.db, &self.txn, |txn| {
            let player_id = player_id.clone();
            let player_name = player_name.clone();
            let email = email.clone();
            Box::pin(async move {
                players::create_player(txn, &player_id, &player_name, &email).await?;
                Ok(())
            })
        })
        .await?;

        info!(player_id = %player_id, "player created");
        Ok(player_id)
    }

    /// Ids of registered players, oldest first, capped at [`MAX_LISTED_PLAYERS`].
    pub async fn list_player_ids(&self) -> Result<Vec<String>, DomainError> {
        players::list_ids(&self.db, MAX_LISTED_PLAYERS).await
    }

    pub async fn get_player(&self, player_id: &str) -> Result<Player, DomainError> {
        players::find_by_id(&self.db, player_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Player, format!("Player {player_id} not found"))
            })
    }
}

fn normalize_name(raw: &str) -> Result<String, DomainError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidPlayerName,
            "player_name must not be empty",
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(
            ValidationKind::InvalidPlayerName,
            format!("player_name must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(name.to_string())
}

fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    if !email_regex().is_match(&email) {
        return Err(DomainError::validation(
            ValidationKind::InvalidEmail,
            "email is not a valid address",
        ));
    }
    Ok(email)
}
