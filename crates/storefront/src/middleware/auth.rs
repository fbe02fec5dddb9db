//! Authentication gate and extractors.
//!
//! Cart, checkout and account handlers take a [`RequireIdentity`] argument.
//! Extraction runs before the handler body, so an anonymous request is
//! redirected to the login page without any service being constructed.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{Identity, session_keys};

/// Where anonymous requests for protected pages are sent.
pub const LOGIN_REDIRECT: &str = "/login?error=login_required";

/// Extractor that requires a logged-in customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireIdentity(identity): RequireIdentity,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
pub struct RequireIdentity(pub Identity);

/// Why a request was turned away by the gate.
#[derive(Debug)]
pub enum AuthRejection {
    /// No customer in the session.
    RedirectToLogin,
    /// The session layer is not installed.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_REDIRECT).into_response(),
            Self::MissingSession => {
                tracing::error!("Session layer missing; rejecting protected request");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Resolve the logged-in customer from a session.
///
/// A session that cannot be read is treated as anonymous.
///
/// # Errors
///
/// Returns `AuthRejection::RedirectToLogin` if nobody is logged in.
pub async fn require_identity(session: &Session) -> Result<Identity, AuthRejection> {
    match session.get::<Identity>(session_keys::IDENTITY).await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => Err(AuthRejection::RedirectToLogin),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read identity from session");
            Err(AuthRejection::RedirectToLogin)
        }
    }
}

impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        let identity = require_identity(session).await?;
        tracing::Span::current().record("customer_id", identity.customer_id.as_i32());
        Ok(Self(identity))
    }
}

/// Extractor that optionally gets the logged-in customer.
///
/// Used by public pages that change their navigation for logged-in visitors.
pub struct OptionalIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = match parts.extensions.get::<Session>() {
            Some(session) => require_identity(session).await.ok(),
            None => None,
        };

        Ok(Self(identity))
    }
}

/// Store the logged-in customer in the session.
///
/// The session ID is cycled first so a pre-login ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_identity(
    session: &Session,
    identity: &Identity,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::IDENTITY, identity).await
}

/// Clear the session on logout.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_identity(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bookstore_core::{CustomerId, Username};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_anonymous_session_redirects_to_login() {
        let session = session();
        let rejection = require_identity(&session).await.unwrap_err();

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            LOGIN_REDIRECT
        );
    }

    #[tokio::test]
    async fn test_identity_round_trips_through_session() {
        let session = session();
        let identity = Identity::new(CustomerId::new(3), Username::parse("reader").unwrap());

        set_identity(&session, &identity).await.unwrap();
        assert_eq!(require_identity(&session).await.unwrap(), identity);

        clear_identity(&session).await.unwrap();
        assert!(require_identity(&session).await.is_err());
    }
}
