//! Read-write transaction wrapper.
//!
//! `with_txn` owns the whole transaction lifecycle: begin (serializable on
//! Postgres), run the closure, commit or roll back per [`txn_policy`], and
//! retry the closure from scratch while it fails with a retryable conflict.
//! Every attempt together runs under one deadline.

use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, IsolationLevel,
    TransactionTrait,
};
use tracing::{debug, warn};

use super::txn_policy::{self, TxnPolicy};
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};

/// Retry budget and deadline for a single `with_txn` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxnRetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Wall-clock budget for all attempts and backoff sleeps together.
    pub deadline: Duration,
}

impl Default for TxnRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(1_000),
            deadline: Duration::from_millis(10_000),
        }
    }
}

impl TxnRetryPolicy {
    /// Exponential backoff ceiling after `failed_attempts` conflicts, capped at `max_backoff`.
    pub fn backoff_ceiling(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// Sleep before the next attempt: somewhere in the upper half of the ceiling,
    /// so colliding callers drift apart.
    fn backoff_for(&self, failed_attempts: u32) -> Duration {
        let ceiling = self.backoff_ceiling(failed_attempts).as_millis() as u64;
        if ceiling == 0 {
            return Duration::ZERO;
        }
        let jittered = rand::rng().random_range(ceiling / 2..=ceiling);
        Duration::from_millis(jittered)
    }
}

/// Execute `f` inside a read-write transaction, retrying on conflict.
///
/// - `Ok` from `f`: commit (or roll back under `TxnPolicy::RollbackOnOk`).
/// - Retryable error (see [`DomainError::is_retryable`]): roll back, back off,
///   run `f` again on a fresh transaction. Once `max_attempts` is spent the
///   call fails with `Conflict(RetryExhausted)`.
/// - Any other error: roll back and return it unchanged.
/// - Deadline expiry: the in-flight transaction is dropped (rolled back) and
///   the call fails with `Infra(Timeout)`.
pub async fn with_txn<R, F>(
    db: &DatabaseConnection,
    policy: &TxnRetryPolicy,
    f: F,
) -> Result<R, DomainError>
where
    R: Send,
    F: for<'c> Fn(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, DomainError>> + Sync,
{
    match tokio::time::timeout(policy.deadline, run_with_retries(db, policy, &f)).await {
        Ok(result) => result,
        Err(_) => {
            let deadline_ms = policy.deadline.as_millis() as u64;
            warn!(deadline_ms, "transaction deadline exceeded; attempt abandoned");
            Err(DomainError::infra(
                InfraErrorKind::Timeout,
                format!("transaction did not complete within {deadline_ms}ms"),
            ))
        }
    }
}

async fn run_with_retries<R, F>(
    db: &DatabaseConnection,
    policy: &TxnRetryPolicy,
    f: &F,
) -> Result<R, DomainError>
where
    R: Send,
    F: for<'c> Fn(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, DomainError>> + Sync,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match run_once(db, f).await {
            Ok(val) => {
                if attempt > 1 {
                    debug!(attempts = attempt, "transaction committed after retry");
                }
                return Ok(val);
            }
            Err(err) if err.is_retryable() => {
                if attempt >= max_attempts {
                    warn!(attempts = attempt, error = %err, "transaction retry budget exhausted");
                    return Err(DomainError::conflict(
                        ConflictKind::RetryExhausted,
                        format!("transaction still conflicting after {attempt} attempts"),
                    ));
                }
                let backoff = policy.backoff_for(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "transaction conflicted; retrying"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn run_once<R, F>(db: &DatabaseConnection, f: &F) -> Result<R, DomainError>
where
    F: for<'c> Fn(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, DomainError>>,
{
    let txn = begin(db).await?;
    let out = f(&txn).await;

    match out {
        Ok(val) => {
            match txn_policy::current() {
                TxnPolicy::CommitOnOk => txn.commit().await?,
                TxnPolicy::RollbackOnOk => txn.rollback().await?,
            }
            Ok(val)
        }
        Err(err) => {
            // Best-effort rollback; preserve original error
            let _ = txn.rollback().await;
            Err(err)
        }
    }
}

async fn begin(db: &DatabaseConnection) -> Result<DatabaseTransaction, DomainError> {
    let txn = match db.get_database_backend() {
        DatabaseBackend::Postgres => {
            db.begin_with_config(Some(IsolationLevel::Serializable), None)
                .await?
        }
        // SQLite transactions are serializable already.
        _ => db.begin().await?,
    };
    Ok(txn)
}
