pub mod matchmaking;

pub use db_infra::config::db;
