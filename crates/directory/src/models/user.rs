//! User domain types.

use cafe_and_wifi_core::{Email, UserId};

/// A registered site user (domain type).
///
/// The password hash is deliberately not part of this type; it is only read
/// by the login path via `UserRepository::get_password_hash`.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
}
