//! Database migration command.
//!
//! Applies the embedded directory migrations and creates the session table.
//! Safe to run repeatedly; applied migrations are skipped.

use cafe_and_wifi_directory::db;

use super::{CommandError, database_url};

/// Run all pending migrations against the directory database.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url();

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
