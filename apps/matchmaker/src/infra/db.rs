use db_infra::config::db::{DbKind, DbOwner, RuntimeEnv};
use migration::MigrationCommand;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::error::AppError;

/// Connect with application credentials and bring the schema up to date.
///
/// An in-memory SQLite database only exists inside its single pooled
/// connection, so it is migrated on that same connection. Every other kind
/// is migrated through an owner connection first.
pub async fn bootstrap_db(
    env: RuntimeEnv,
    kind: DbKind,
) -> Result<DatabaseConnection, AppError> {
    if kind == DbKind::SqliteMemory {
        let conn = db_infra::connect(env, kind, DbOwner::App).await?;
        db_infra::run_migration(&conn, MigrationCommand::Up).await?;
        info!(?env, ?kind, "database ready");
        return Ok(conn);
    }

    db_infra::orchestrate_migration(env, kind, MigrationCommand::Up).await?;
    let conn = db_infra::connect(env, kind, DbOwner::App).await?;
    info!(?env, ?kind, "database ready");
    Ok(conn)
}
