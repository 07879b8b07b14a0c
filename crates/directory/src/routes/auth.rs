//! Authentication route handlers.
//!
//! Handles registration, login and logout with locally stored Argon2id
//! password hashes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::{FormErrors, LoginForm, RegisterForm, fields};
use crate::middleware::{OptionalAuth, clear_current_user, push_flash, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Flash shown for any failed login.
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid email or password";

/// Flash shown after a successful registration.
pub const REGISTERED_MESSAGE: &str = "Account created, please login!";

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub email: String,
    pub errors: FormErrors,
}

impl LoginTemplate {
    fn label(name: &str) -> &'static str {
        fields::label(fields::LOGIN, name)
    }
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub errors: FormErrors,
}

impl RegisterTemplate {
    fn label(name: &str) -> &'static str {
        fields::label(fields::REGISTER, name)
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(session: Session, user: OptionalAuth) -> LoginTemplate {
    LoginTemplate {
        page: PageContext::load(&session, user.0).await,
        email: String::new(),
        errors: FormErrors::new(),
    }
}

/// Handle login form submission.
///
/// Unknown email and wrong password produce the same flash message.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    user: OptionalAuth,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return Ok(LoginTemplate {
                page: PageContext::load(&session, user.0).await,
                email: form.email,
                errors,
            }
            .into_response());
        }
    };

    match AuthService::new(state.pool())
        .login(&credentials.email, &credentials.password)
        .await
    {
        Ok(logged_in) => {
            let current = CurrentUser::from(&logged_in);
            set_current_user(&session, &current).await?;
            set_sentry_user(&current.id, Some(current.email.as_str()));
            tracing::info!(user_id = %current.id, "User logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login rejected");
            push_flash(&session, INVALID_LOGIN_MESSAGE).await;
            Ok(LoginTemplate {
                page: PageContext::load(&session, user.0).await,
                email: form.email,
                errors: FormErrors::new(),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Log out and return to the home page.
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(session: Session, user: OptionalAuth) -> RegisterTemplate {
    RegisterTemplate {
        page: PageContext::load(&session, user.0).await,
        name: String::new(),
        email: String::new(),
        errors: FormErrors::new(),
    }
}

/// Handle registration form submission.
///
/// A duplicate email is reported on the email field and nothing is stored.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    user: OptionalAuth,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let registration = form.validate();

    let errors = match registration {
        Ok(registration) => {
            match AuthService::new(state.pool())
                .register(
                    &registration.name,
                    &registration.email,
                    &registration.password,
                )
                .await
            {
                Ok(created) => {
                    tracing::info!(user_id = %created.id, "User registered");
                    push_flash(&session, REGISTERED_MESSAGE).await;
                    return Ok(Redirect::to("/login").into_response());
                }
                Err(AuthError::UserAlreadyExists) => FormErrors::single(
                    "email",
                    "An account with this email already exists.",
                ),
                Err(e) => return Err(e.into()),
            }
        }
        Err(errors) => errors,
    };

    Ok(RegisterTemplate {
        page: PageContext::load(&session, user.0).await,
        name: form.name,
        email: form.email,
        errors,
    }
    .into_response())
}
