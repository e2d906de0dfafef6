//! Matchmaking tunables loaded from the environment.
//!
//! | variable                  | default | meaning                                   |
//! |---------------------------|---------|-------------------------------------------|
//! | `MATCHMAKING_SAMPLE_SIZE` | 100     | max idle players pulled into a new game   |
//! | `TXN_MAX_ATTEMPTS`        | 5       | attempts per transaction, first included  |
//! | `TXN_INITIAL_BACKOFF_MS`  | 20      | backoff after the first conflict          |
//! | `TXN_MAX_BACKOFF_MS`      | 1000    | backoff cap                               |
//! | `TXN_DEADLINE_MS`         | 10000   | budget for all attempts of one call       |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::db::txn::TxnRetryPolicy;
use crate::error::AppError;

pub const DEFAULT_SAMPLE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchmakingSettings {
    /// Upper bound on the roster size of a new game.
    pub sample_size: u64,
    pub txn: TxnRetryPolicy,
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            txn: TxnRetryPolicy::default(),
        }
    }
}

impl MatchmakingSettings {
    /// Read settings from the environment. Unset variables take their
    /// defaults; set-but-invalid ones are configuration errors.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let settings = Self {
            sample_size: parse_var("MATCHMAKING_SAMPLE_SIZE", defaults.sample_size)?,
            txn: TxnRetryPolicy {
                max_attempts: parse_var("TXN_MAX_ATTEMPTS", defaults.txn.max_attempts)?,
                initial_backoff: parse_millis(
                    "TXN_INITIAL_BACKOFF_MS",
                    defaults.txn.initial_backoff,
                )?,
                max_backoff: parse_millis("TXN_MAX_BACKOFF_MS", defaults.txn.max_backoff)?,
                deadline: parse_millis("TXN_DEADLINE_MS", defaults.txn.deadline)?,
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.sample_size == 0 {
            return Err(AppError::config("MATCHMAKING_SAMPLE_SIZE must be at least 1"));
        }
        if self.txn.max_attempts == 0 {
            return Err(AppError::config("TXN_MAX_ATTEMPTS must be at least 1"));
        }
        if self.txn.max_backoff < self.txn.initial_backoff {
            return Err(AppError::config(
                "TXN_MAX_BACKOFF_MS must not be smaller than TXN_INITIAL_BACKOFF_MS",
            ));
        }
        if self.txn.deadline.is_zero() {
            return Err(AppError::config("TXN_DEADLINE_MS must be positive"));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            AppError::config(format!("{name} must be a non-negative integer, got '{raw}'"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_millis(name: &str, default: Duration) -> Result<Duration, AppError> {
    parse_var(name, default.as_millis() as u64).map(Duration::from_millis)
}
