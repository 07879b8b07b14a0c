//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! cw-cli user create -n "Ada Lovelace" -e ada@example.com -p "correct horse"
//! ```

use cafe_and_wifi_core::Email;
use cafe_and_wifi_directory::db;
use cafe_and_wifi_directory::services::{AuthError, AuthService};
use thiserror::Error;

use super::{CommandError, database_url};

/// Errors that can occur while creating a user.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The email address failed validation.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// A user with this email already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// Registration failed for another reason.
    #[error("Registration failed: {0}")]
    Auth(#[from] AuthError),
}

/// Create a user account.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns an error if the email is invalid or taken, or the database fails.
pub async fn create(name: &str, email: &str, password: &str) -> Result<i64, UserError> {
    let email = Email::parse(email).map_err(|e| UserError::InvalidEmail(e.to_string()))?;

    let database_url = database_url();
    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url)
        .await
        .map_err(CommandError::from)?;

    tracing::info!("Creating user: {}", email);

    let user = AuthService::new(&pool)
        .register(name, &email, password)
        .await
        .map_err(|e| match e {
            AuthError::UserAlreadyExists => UserError::UserExists(email.to_string()),
            other => UserError::Auth(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id.as_i64())
}
