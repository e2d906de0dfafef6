use std::env;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sea_orm::DatabaseBackend;

use crate::error::DbInfraError;

/// Runtime environment the database belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Prod,
    Test,
}

impl RuntimeEnv {
    fn suffix(self) -> &'static str {
        match self {
            RuntimeEnv::Prod => "prod",
            RuntimeEnv::Test => "test",
        }
    }
}

/// Database engine and storage flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    /// Private to a single pooled connection; contents vanish with it.
    SqliteMemory,
}

impl DbKind {
    pub fn is_sqlite(self) -> bool {
        matches!(self, DbKind::SqliteFile | DbKind::SqliteMemory)
    }
}

impl From<DbKind> for DatabaseBackend {
    fn from(kind: DbKind) -> Self {
        match kind {
            DbKind::Postgres => DatabaseBackend::Postgres,
            DbKind::SqliteFile | DbKind::SqliteMemory => DatabaseBackend::Sqlite,
        }
    }
}

/// Database owner enum for different access levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbOwner {
    /// Application-level access (limited permissions)
    App,
    /// Owner-level access (full permissions for migrations)
    Owner,
}

/// Reject combinations that cannot work before any connection is attempted.
pub fn validate_db_config(env: RuntimeEnv, kind: DbKind) -> Result<(), DbInfraError> {
    if kind == DbKind::SqliteMemory && env == RuntimeEnv::Prod {
        return Err(DbInfraError::config(
            "sqlite in-memory databases are only allowed in the test environment",
        ));
    }
    Ok(())
}

/// Builds a connection string from environment variables.
pub fn make_conn_spec(
    env: RuntimeEnv,
    kind: DbKind,
    owner: DbOwner,
) -> Result<String, DbInfraError> {
    match kind {
        DbKind::Postgres => postgres_url(env, owner),
        DbKind::SqliteFile => sqlite_file_spec(env),
        DbKind::SqliteMemory => Ok("sqlite::memory:".to_string()),
    }
}

fn postgres_url(env: RuntimeEnv, owner: DbOwner) -> Result<String, DbInfraError> {
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let db_name = db_name(env)?;
    let (username, password) = credentials(owner)?;

    let username = utf8_percent_encode(&username, NON_ALPHANUMERIC);
    let password = utf8_percent_encode(&password, NON_ALPHANUMERIC);

    Ok(format!(
        "postgresql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

/// Path of the SQLite database file for the given environment.
pub fn sqlite_file_spec(env: RuntimeEnv) -> Result<String, DbInfraError> {
    let dir = env::var("SQLITE_DB_DIR").unwrap_or_else(|_| ".".to_string());
    let dir = dir.trim_end_matches('/');
    Ok(format!(
        "sqlite://{dir}/matchmaker_{}.db?mode=rwc",
        env.suffix()
    ))
}

fn db_name(env: RuntimeEnv) -> Result<String, DbInfraError> {
    match env {
        RuntimeEnv::Prod => must_var("PROD_DB"),
        RuntimeEnv::Test => {
            let db_name = must_var("TEST_DB")?;
            // Enforce safety: test DB must end with "_test"
            if !db_name.ends_with("_test") {
                return Err(DbInfraError::config(format!(
                    "Test profile requires database name to end with '_test', but got: '{db_name}'"
                )));
            }
            Ok(db_name)
        }
    }
}

fn credentials(owner: DbOwner) -> Result<(String, String), DbInfraError> {
    match owner {
        DbOwner::App => Ok((must_var("APP_DB_USER")?, must_var("APP_DB_PASSWORD")?)),
        DbOwner::Owner => Ok((must_var("MATCHMAKER_OWNER_USER")?, must_var("MATCHMAKER_OWNER_PASSWORD")?)),
    }
}

fn must_var(name: &str) -> Result<String, DbInfraError> {
    env::var(name).map_err(|_| {
        DbInfraError::config(format!("Required environment variable '{name}' is not set"))
    })
}
