//! Authentication route handlers.
//!
//! Signup and login call the identity procedures through
//! [`IdentityService`]; the resulting [`Identity`](crate::models::Identity)
//! is kept in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash::{self, MessageQuery};
use crate::middleware::{OptionalIdentity, clear_identity, set_identity};
use crate::services::{AuthError, IdentityService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Signup form data.
#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
}

// =============================================================================
// Signup
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    OptionalIdentity(identity): OptionalIdentity,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    SignupTemplate {
        page: PageContext::new(identity.as_ref(), query),
    }
}

/// Handle signup form submission.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let password = SecretString::from(form.password);
    let result = IdentityService::new(state.store())
        .signup(&form.username, &password, &form.first_name, &form.last_name)
        .await;

    match result {
        Ok(_) => flash::redirect_success("/login", "account_created").into_response(),
        Err(e) => {
            log_auth_failure("signup", &e);
            flash::redirect_error("/signup", e.code()).into_response()
        }
    }
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalIdentity(identity): OptionalIdentity,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        page: PageContext::new(identity.as_ref(), query),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = SecretString::from(form.password);
    let identity = match IdentityService::new(state.store())
        .authenticate(&form.username, &password)
        .await
    {
        Ok(identity) => identity,
        Err(e) => {
            log_auth_failure("login", &e);
            return flash::redirect_error("/login", e.code()).into_response();
        }
    };

    if let Err(e) = set_identity(&session, &identity).await {
        tracing::error!(error = %e, "Failed to set session");
        return flash::redirect_error("/login", "session").into_response();
    }

    set_sentry_user(&identity.customer_id, identity.username.as_str());
    tracing::info!(customer_id = %identity.customer_id, "Customer logged in");
    flash::redirect_success("/customer/profile", "logged_in").into_response()
}

/// Log out and return to the home page.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_identity(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();
    flash::redirect_success("/", "logged_out")
}

fn log_auth_failure(operation: &str, err: &AuthError) {
    match err {
        AuthError::Repository(e) => {
            tracing::error!(operation, error = %e, "Identity procedure failed");
        }
        other => tracing::info!(operation, code = other.code(), "Rejected credentials"),
    }
}
