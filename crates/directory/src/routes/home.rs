//! Home page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use cafe_and_wifi_core::{Location, LocationFilter};

use super::{PageContext, SelectOption, select_options};
use crate::db::CafeRepository;
use crate::error::Result;
use crate::filters;
use crate::forms::{FormErrors, LocationSearchForm, fields};
use crate::middleware::OptionalAuth;
use crate::models::Cafe;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageContext,
    pub cafes: Vec<Cafe>,
    /// How many different locations have at least one café.
    pub num_locations: i64,
    pub location_options: Vec<SelectOption>,
    pub errors: FormErrors,
}

impl IndexTemplate {
    fn label(name: &str) -> &'static str {
        fields::label(fields::LOCATION_SEARCH, name)
    }
}

async fn render(
    state: &AppState,
    session: &Session,
    user: OptionalAuth,
    form: &LocationSearchForm,
    errors: FormErrors,
) -> Result<IndexTemplate> {
    let cafes = CafeRepository::new(state.pool());

    Ok(IndexTemplate {
        page: PageContext::load(session, user.0).await,
        cafes: cafes.list_all().await?,
        num_locations: cafes.distinct_location_count().await?,
        location_options: select_options(LocationFilter::labels(), &form.location),
        errors,
    })
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    user: OptionalAuth,
) -> Result<IndexTemplate> {
    render(
        &state,
        &session,
        user,
        &LocationSearchForm::default(),
        FormErrors::new(),
    )
    .await
}

/// URL of the results page for one location.
#[must_use]
pub fn location_results_path(location: Location) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("location", location.label())
        .finish();
    format!("/search_by_location?{query}")
}

/// Handle the location filter form.
#[instrument(skip_all, fields(location = %form.location))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    user: OptionalAuth,
    Form(form): Form<LocationSearchForm>,
) -> Result<Response> {
    match form.validate() {
        Ok(LocationFilter::All) => Ok(Redirect::to("/all_cafes").into_response()),
        Ok(LocationFilter::Only(location)) => {
            Ok(Redirect::to(&location_results_path(location)).into_response())
        }
        Err(errors) => Ok(render(&state, &session, user, &form, errors)
            .await?
            .into_response()),
    }
}
