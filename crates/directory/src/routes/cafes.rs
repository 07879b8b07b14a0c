//! Café listing and submission route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cafe_and_wifi_core::{Location, SeatRange, UnknownChoice};

use super::{PageContext, SelectOption, select_options};
use crate::db::{CafeRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{AddCafeForm, FormErrors, NewCafeInput, fields};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Cafe, CurrentUser, NewCafe};
use crate::services::ImageUpload;
use crate::state::AppState;

/// Message shown when a café name is already taken.
pub const DUPLICATE_NAME_MESSAGE: &str = "A cafe with this name already exists.";

/// Message shown when the image host rejects or fails an upload.
pub const UPLOAD_FAILED_MESSAGE: &str = "Image upload failed, please try again.";

// =============================================================================
// Results
// =============================================================================

/// Results page template, shared by the location and "all" listings.
#[derive(Template, WebTemplate)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub page: PageContext,
    pub heading: String,
    pub cafes: Vec<Cafe>,
}

/// Query parameters for `/search_by_location`.
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

/// List the cafés in one location.
///
/// A missing or unknown `location` is a bad request.
#[instrument(skip(state, session, user))]
pub async fn search_by_location(
    State(state): State<AppState>,
    session: Session,
    user: OptionalAuth,
    Query(query): Query<LocationQuery>,
) -> Result<ResultsTemplate> {
    let raw = query
        .location
        .ok_or_else(|| AppError::BadRequest("missing location".to_string()))?;
    let location: Location = raw
        .parse()
        .map_err(|e: UnknownChoice| AppError::BadRequest(e.to_string()))?;

    let cafes = CafeRepository::new(state.pool())
        .list_by_location(location)
        .await?;

    Ok(ResultsTemplate {
        page: PageContext::load(&session, user.0).await,
        heading: format!("Cafes in {location}"),
        cafes,
    })
}

/// List every café.
#[instrument(skip_all)]
pub async fn all_cafes(
    State(state): State<AppState>,
    session: Session,
    user: OptionalAuth,
) -> Result<ResultsTemplate> {
    let cafes = CafeRepository::new(state.pool()).list_all().await?;

    Ok(ResultsTemplate {
        page: PageContext::load(&session, user.0).await,
        heading: "All Cafes".to_string(),
        cafes,
    })
}

// =============================================================================
// Add café
// =============================================================================

/// Add-café page template.
#[derive(Template, WebTemplate)]
#[template(path = "add_cafe.html")]
pub struct AddCafeTemplate {
    pub page: PageContext,
    pub form: AddCafeForm,
    pub location_options: Vec<SelectOption>,
    pub seat_options: Vec<SelectOption>,
    pub errors: FormErrors,
}

impl AddCafeTemplate {
    fn label(name: &str) -> &'static str {
        fields::label(fields::ADD_CAFE, name)
    }

    async fn new(
        session: &Session,
        user: CurrentUser,
        form: AddCafeForm,
        errors: FormErrors,
    ) -> Self {
        Self {
            page: PageContext::load(session, Some(user)).await,
            location_options: select_options(Location::labels(), &form.location),
            seat_options: select_options(SeatRange::labels(), &form.seats),
            form,
            errors,
        }
    }
}

/// Display the add-café form.
pub async fn add_cafe_page(RequireAuth(user): RequireAuth, session: Session) -> AddCafeTemplate {
    AddCafeTemplate::new(&session, user, AddCafeForm::default(), FormErrors::new()).await
}

/// Read the multipart body into the raw form and the image part.
async fn read_submission(
    mut multipart: Multipart,
) -> Result<(AddCafeForm, Option<ImageUpload>)> {
    let mut form = AddCafeForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "img_url" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(ToString::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;

            if !filename.is_empty() && !bytes.is_empty() {
                form.image_filename.clone_from(&filename);
                image = Some(ImageUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        match name.as_str() {
            "name" => form.name = value,
            "map_url" => form.map_url = value,
            "location" => form.location = value,
            "seats" => form.seats = value,
            "coffee_price" => form.coffee_price = value,
            "opening_time" => form.opening_time = value,
            "description" => form.description = value,
            // Checkboxes only appear when ticked.
            "has_sockets" => form.has_sockets = true,
            "has_toilet" => form.has_toilet = true,
            "has_wifi" => form.has_wifi = true,
            "can_take_calls" => form.can_take_calls = true,
            _ => {}
        }
    }

    Ok((form, image))
}

fn into_new_cafe(input: NewCafeInput, img_url: url::Url, author: &CurrentUser) -> NewCafe {
    NewCafe {
        name: input.name,
        map_url: input.map_url,
        img_url,
        location: input.location,
        has_sockets: input.has_sockets,
        has_toilet: input.has_toilet,
        has_wifi: input.has_wifi,
        can_take_calls: input.can_take_calls,
        seats: input.seats,
        coffee_price: input.coffee_price,
        description: input.description,
        opening_time: input.opening_time,
        author_id: author.id,
    }
}

/// Handle the add-café form.
///
/// The name is checked for duplicates before the photo is uploaded so a
/// rejected submission never leaves an orphaned image behind. The unique
/// constraint still catches a race between two submissions.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add_cafe(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let (form, image) = read_submission(multipart).await?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(AddCafeTemplate::new(&session, user, form, errors)
                .await
                .into_response());
        }
    };

    let cafes = CafeRepository::new(state.pool());
    if cafes.name_exists(&input.name).await? {
        let errors = FormErrors::single("name", DUPLICATE_NAME_MESSAGE);
        return Ok(AddCafeTemplate::new(&session, user, form, errors)
            .await
            .into_response());
    }

    // validate() already rejected a missing image; this is the typed proof.
    let Some(image) = image else {
        let errors = FormErrors::single("img_url", "This field is required.");
        return Ok(AddCafeTemplate::new(&session, user, form, errors)
            .await
            .into_response());
    };

    let img_url = match state.image_host().upload(image).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "Image upload failed");
            let errors = FormErrors::single("img_url", UPLOAD_FAILED_MESSAGE);
            return Ok(AddCafeTemplate::new(&session, user, form, errors)
                .await
                .into_response());
        }
    };

    match cafes.create(&into_new_cafe(input, img_url, &user)).await {
        Ok(cafe) => {
            tracing::info!(cafe_id = %cafe.id, name = %cafe.name, "Cafe added");
            Ok(Redirect::to("/").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            let errors = FormErrors::single("name", DUPLICATE_NAME_MESSAGE);
            Ok(AddCafeTemplate::new(&session, user, form, errors)
                .await
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}
