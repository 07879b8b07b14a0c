//! Café detail page: map, comments and replies.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cafe_and_wifi_core::{CafeId, CommentId};

use super::PageContext;
use crate::db::{CafeRepository, CommentRepository, ReplyRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{CommentForm, FormErrors, ReplyForm, fields};
use crate::middleware::{OptionalAuth, push_flash};
use crate::models::{Cafe, CommentThread, CurrentUser};
use crate::services::MapMarker;
use crate::state::AppState;

/// Flash shown when an anonymous visitor tries to post.
pub const NOT_LOGGED_IN_MESSAGE: &str = "Not logged in";

/// Date format stored on comments and replies.
const POST_DATE_FORMAT: &str = "%d-%m-%Y";

/// Café detail template.
#[derive(Template, WebTemplate)]
#[template(path = "cafe_details.html")]
pub struct CafeDetailsTemplate {
    pub page: PageContext,
    pub cafe: Cafe,
    pub map: Option<MapMarker>,
    pub threads: Vec<CommentThread>,
    /// Entered comment text, kept on a failed submission.
    pub comment_text: String,
    /// Entered reply text and the comment it was for.
    pub reply_text: String,
    pub reply_to: Option<i64>,
    pub errors: FormErrors,
}

impl CafeDetailsTemplate {
    fn label(name: &str) -> &'static str {
        fields::label(fields::COMMENT, name)
    }
}

/// `?comment_id=` marks a POST as a reply.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub comment_id: Option<i64>,
}

/// Either form's text; only one is present per submission.
#[derive(Debug, Default, Deserialize)]
pub struct DetailForm {
    #[serde(flatten)]
    pub comment: CommentForm,
    #[serde(flatten)]
    pub reply: ReplyForm,
}

/// What a failed submission should re-render.
#[derive(Default)]
struct Pending {
    comment_text: String,
    reply_text: String,
    reply_to: Option<i64>,
    errors: FormErrors,
}

async fn load_cafe(state: &AppState, cafe_id: CafeId) -> Result<Cafe> {
    CafeRepository::new(state.pool())
        .get_by_id(cafe_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cafe {cafe_id}")))
}

/// Geocode the café's map reference. Failures only cost the map.
async fn locate(state: &AppState, cafe: &Cafe) -> Option<MapMarker> {
    match state.geocoder().locate(&cafe.map_url).await {
        Ok(Some(coordinates)) => Some(MapMarker::new(coordinates, cafe.name.clone())),
        Ok(None) => {
            tracing::debug!(cafe_id = %cafe.id, "No geocode match");
            None
        }
        Err(e) => {
            tracing::warn!(cafe_id = %cafe.id, error = %e, "Geocoding failed");
            None
        }
    }
}

async fn render(
    state: &AppState,
    session: &Session,
    user: Option<CurrentUser>,
    cafe: Cafe,
    pending: Pending,
) -> Result<CafeDetailsTemplate> {
    let comments = CommentRepository::new(state.pool())
        .list_for_cafe(cafe.id)
        .await?;
    let replies = ReplyRepository::new(state.pool())
        .list_for_cafe(cafe.id)
        .await?;
    let map = locate(state, &cafe).await;

    Ok(CafeDetailsTemplate {
        page: PageContext::load(session, user).await,
        map,
        threads: CommentThread::assemble(comments, replies),
        cafe,
        comment_text: pending.comment_text,
        reply_text: pending.reply_text,
        reply_to: pending.reply_to,
        errors: pending.errors,
    })
}

/// Display a café with its map and comments.
#[instrument(skip(state, session, user))]
pub async fn cafe_detail(
    State(state): State<AppState>,
    session: Session,
    user: OptionalAuth,
    Path(cafe_id): Path<i64>,
) -> Result<CafeDetailsTemplate> {
    let cafe = load_cafe(&state, CafeId::new(cafe_id)).await?;
    render(&state, &session, user.0, cafe, Pending::default()).await
}

fn today() -> String {
    chrono::Local::now().format(POST_DATE_FORMAT).to_string()
}

/// Post a comment, or a reply when `?comment_id=` is present.
///
/// Anonymous posts are refused with a flash message and store nothing.
#[instrument(skip(state, session, user, form))]
pub async fn post_to_cafe(
    State(state): State<AppState>,
    session: Session,
    user: OptionalAuth,
    Path(cafe_id): Path<i64>,
    Query(query): Query<DetailQuery>,
    Form(form): Form<DetailForm>,
) -> Result<Response> {
    let cafe = load_cafe(&state, CafeId::new(cafe_id)).await?;
    let detail_path = format!("/cafe_details/{}", cafe.id);

    let Some(author) = user.0 else {
        push_flash(&session, NOT_LOGGED_IN_MESSAGE).await;
        return Ok(Redirect::to(&detail_path).into_response());
    };

    let date = today();

    let pending = match query.comment_id {
        Some(comment_id) => {
            let comment = CommentRepository::new(state.pool())
                .get_by_id(CommentId::new(comment_id))
                .await?
                .filter(|c| c.cafe_id == cafe.id)
                .ok_or_else(|| AppError::NotFound(format!("comment {comment_id}")))?;

            match form.reply.validate() {
                Ok(text) => {
                    ReplyRepository::new(state.pool())
                        .create(comment.id, author.id, &text, &date)
                        .await?;
                    tracing::info!(comment_id = %comment.id, "Reply posted");
                    return Ok(Redirect::to(&detail_path).into_response());
                }
                Err(errors) => Pending {
                    reply_text: form.reply.reply_text,
                    reply_to: Some(comment_id),
                    errors,
                    ..Pending::default()
                },
            }
        }
        None => match form.comment.validate() {
            Ok(text) => {
                CommentRepository::new(state.pool())
                    .create(cafe.id, author.id, &text, &date)
                    .await?;
                tracing::info!(cafe_id = %cafe.id, "Comment posted");
                return Ok(Redirect::to(&detail_path).into_response());
            }
            Err(errors) => Pending {
                comment_text: form.comment.text,
                errors,
                ..Pending::default()
            },
        },
    };

    Ok(render(&state, &session, Some(author), cafe, pending)
        .await?
        .into_response())
}
