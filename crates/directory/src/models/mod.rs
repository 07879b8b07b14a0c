//! Domain models for the directory.
//!
//! These types are separate from the database row structs in `crate::db`;
//! repositories convert rows into these after validating stored values.

pub mod avatar;
pub mod cafe;
pub mod comment;
pub mod session;
pub mod user;

pub use cafe::{Cafe, NewCafe};
pub use comment::{Comment, CommentThread, Reply};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
