//! HTTP route handlers for the directory.
//!
//! # Route Structure
//!
//! ```text
//! GET|POST /                                   - Café list + location filter
//! GET|POST /login                              - Login
//! GET|POST /register                           - Register
//! GET      /logout                             - Logout
//! GET|POST /search_by_location?location=<name> - Cafés in one location
//! GET|POST /all_cafes                          - Every café
//! GET|POST /add_cafe                           - Add a café (requires auth, multipart)
//! GET|POST /cafe_details/{cafe_id}             - Café page; POST comments,
//!                                                or replies with ?comment_id=
//! GET|POST /like_comment/{cafe_id}/{comment_id} - Like a comment (requires auth)
//! GET|POST /like_cafe/{cafe_id}                - Like a café (requires auth)
//! GET      /health                             - Liveness
//! GET      /health/ready                       - Readiness (database)
//! ```

pub mod auth;
pub mod cafes;
pub mod details;
pub mod health;
pub mod home;
pub mod likes;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_sessions::Session;

use crate::middleware::take_flashes;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Largest accepted add-café submission (photo included).
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// Shared view data
// =============================================================================

/// Data every page's layout needs.
pub struct PageContext {
    /// The logged-in user, if any.
    pub current_user: Option<CurrentUser>,
    /// Flash messages queued since the last render.
    pub flashes: Vec<String>,
}

impl PageContext {
    /// Build the layout context, draining queued flash messages.
    pub async fn load(session: &Session, current_user: Option<CurrentUser>) -> Self {
        Self {
            current_user,
            flashes: take_flashes(session).await,
        }
    }
}

/// One `<option>` in a `<select>`.
pub struct SelectOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Build `<select>` options, marking the one equal to `selected`.
#[must_use]
pub fn select_options(labels: Vec<&'static str>, selected: &str) -> Vec<SelectOption> {
    labels
        .into_iter()
        .map(|value| SelectOption {
            value,
            selected: value == selected.trim(),
        })
        .collect()
}

// =============================================================================
// Router
// =============================================================================

/// Create all routes for the directory.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home).post(home::search))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route(
            "/search_by_location",
            get(cafes::search_by_location).post(cafes::search_by_location),
        )
        .route("/all_cafes", get(cafes::all_cafes).post(cafes::all_cafes))
        .route(
            "/add_cafe",
            get(cafes::add_cafe_page)
                .post(cafes::add_cafe)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/cafe_details/{cafe_id}",
            get(details::cafe_detail).post(details::post_to_cafe),
        )
        .route(
            "/like_comment/{cafe_id}/{comment_id}",
            get(likes::like_comment).post(likes::like_comment),
        )
        .route(
            "/like_cafe/{cafe_id}",
            get(likes::like_cafe).post(likes::like_cafe),
        )
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
