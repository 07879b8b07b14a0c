//! CLI command implementations.

pub mod migrate;
pub mod user;

use cafe_and_wifi_directory::config;
use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by commands that open the database.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Database connection or migration error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The database the directory server uses, loading `.env` first.
fn database_url() -> SecretString {
    dotenvy::dotenv().ok();
    config::database_url()
}
