//! Like counters for cafés and comments.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tracing::instrument;

use cafe_and_wifi_core::{CafeId, CommentId};

use crate::db::{CafeRepository, CommentRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

fn detail_redirect(cafe_id: CafeId) -> Redirect {
    Redirect::to(&format!("/cafe_details/{cafe_id}"))
}

/// Add one like to a comment, then return to its café.
///
/// The comment must belong to the café in the path.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn like_comment(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path((cafe_id, comment_id)): Path<(i64, i64)>,
) -> Result<Redirect> {
    let cafe_id = CafeId::new(cafe_id);
    let comments = CommentRepository::new(state.pool());

    let comment = comments
        .get_by_id(CommentId::new(comment_id))
        .await?
        .filter(|c| c.cafe_id == cafe_id)
        .ok_or_else(|| AppError::NotFound(format!("comment {comment_id}")))?;

    comments.increment_likes(comment.id).await?;
    Ok(detail_redirect(cafe_id))
}

/// Add one like to a café, then return to it.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn like_cafe(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(cafe_id): Path<i64>,
) -> Result<Redirect> {
    let cafe_id = CafeId::new(cafe_id);
    CafeRepository::new(state.pool())
        .increment_likes(cafe_id)
        .await?;
    Ok(detail_redirect(cafe_id))
}
