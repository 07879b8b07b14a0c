//! Session middleware configuration.
//!
//! Sets up `SQLite`-backed sessions using tower-sessions, with the cookie
//! signed by a key derived from `CAFE_SESSION_SECRET`.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use sqlx::SqlitePool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::DirectoryConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cw_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The concrete session layer used by the router.
pub type SessionLayer = SessionManagerLayer<SqliteStore, SignedCookie>;

/// Derive the 64-byte cookie signing key from the configured secret.
fn signing_key(config: &DirectoryConfig) -> Key {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Create the session layer with `SQLite` store.
///
/// The session table is created by `db::migrate`.
#[must_use]
pub fn create_session_layer(pool: &SqlitePool, config: &DirectoryConfig) -> SessionLayer {
    let store = SqliteStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config))
}
