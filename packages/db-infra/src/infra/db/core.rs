use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::{info, warn};

use crate::config::db::{make_conn_spec, validate_db_config, DbKind, DbOwner, RuntimeEnv};
use crate::error::DbInfraError;

const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

fn get_db_engine(db_kind: DbKind) -> &'static str {
    match db_kind {
        DbKind::Postgres => "postgresql",
        DbKind::SqliteFile | DbKind::SqliteMemory => "sqlite",
    }
}

async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, DbInfraError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbInfraError>>,
{
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(
                        "connection_retry=success attempts={} interval_ms={}",
                        attempt, interval_ms
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < max_attempts {
                    warn!(
                        "connection_retry=failed attempt={} max_attempts={} interval_ms={}",
                        attempt, max_attempts, interval_ms
                    );
                    tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| DbInfraError::Connect {
        message: "no error recorded after max attempts".to_string(),
    }))
}

/// Open a connection pool for the given environment, engine and owner.
///
/// In-memory SQLite is pinned to a single connection so every caller sees
/// the same database; this also serialises its transactions.
pub async fn connect(
    env: RuntimeEnv,
    db_kind: DbKind,
    owner: DbOwner,
) -> Result<DatabaseConnection, DbInfraError> {
    validate_db_config(env, db_kind)?;
    let url = make_conn_spec(env, db_kind, owner)?;

    let mut opt = ConnectOptions::new(&url);
    opt.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    match db_kind {
        DbKind::SqliteMemory => {
            opt.min_connections(1).max_connections(1);
        }
        DbKind::SqliteFile => {
            opt.min_connections(1).max_connections(4);
        }
        DbKind::Postgres => {
            opt.min_connections(2).max_connections(16);
        }
    }

    info!(
        db_engine = get_db_engine(db_kind),
        db_url = %sanitize_db_url(&url),
        ?owner,
        "connecting to database"
    );

    let pool = if db_kind == DbKind::Postgres {
        retry_connection(
            || {
                let opt = opt.clone();
                async move {
                    Database::connect(opt)
                        .await
                        .map_err(|e| DbInfraError::Connect {
                            message: format!("failed to connect to Postgres: {e}"),
                        })
                }
            },
            5,
            500,
        )
        .await?
    } else {
        Database::connect(opt)
            .await
            .map_err(|e| DbInfraError::Connect {
                message: format!("failed to connect to SQLite: {e}"),
            })?
    };

    if db_kind.is_sqlite() {
        apply_sqlite_settings(&pool, db_kind).await?;
    }

    Ok(pool)
}

/// Connect with owner credentials and run a migration command.
pub async fn orchestrate_migration(
    env: RuntimeEnv,
    db_kind: DbKind,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    let admin_pool = connect(env, db_kind, DbOwner::Owner).await?;
    run_migration(&admin_pool, command).await
}

/// Run a migration command on an already-open connection.
pub async fn run_migration(
    conn: &DatabaseConnection,
    command: MigrationCommand,
) -> Result<(), DbInfraError> {
    migrate(conn, command)
        .await
        .map_err(|e| DbInfraError::Migration {
            message: e.to_string(),
        })
}

/// Sanitize database URL by masking password in connection strings.
pub fn sanitize_db_url(url: &str) -> String {
    let Some((auth_part, host_part)) = url.rsplit_once('@') else {
        return url.to_string();
    };
    match auth_part.rfind(':') {
        Some(colon_pos) if colon_pos > auth_part.find("://").map_or(0, |p| p + 2) => {
            format!("{}:***@{}", &auth_part[..colon_pos], host_part)
        }
        _ => url.to_string(),
    }
}

async fn apply_sqlite_settings(
    pool: &DatabaseConnection,
    db_kind: DbKind,
) -> Result<(), DbInfraError> {
    let mut statements = vec![
        "PRAGMA foreign_keys = ON;".to_string(),
        format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS};"),
    ];
    if db_kind == DbKind::SqliteFile {
        statements.push("PRAGMA journal_mode = WAL;".to_string());
        statements.push("PRAGMA synchronous = NORMAL;".to_string());
    }

    for stmt in statements {
        pool.execute(Statement::from_string(db_kind.into(), stmt))
            .await
            .map_err(|e| DbInfraError::Config {
                message: format!("failed to apply sqlite settings: {e}"),
            })?;
    }
    Ok(())
}
