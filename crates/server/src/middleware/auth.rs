//! Authentication middleware and extractors.
//!
//! Provides per-role extractors for requiring a logged-in user in route
//! handlers. Each role has its own login page, so each extractor redirects
//! to its own page on rejection.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use milkround_core::Role;

use crate::models::{CurrentUser, session_keys};

/// Error returned when a role gate rejects the request.
pub enum AuthRejection {
    /// Redirect to the role's login page.
    RedirectToLogin(Role),
    /// Session layer missing, nothing sensible to redirect to.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(role) => {
                Redirect::to(&format!("/{}/login", role.path_segment())).into_response()
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

async fn require_role(parts: &mut Parts, role: Role) -> Result<CurrentUser, AuthRejection> {
    // The session lives in extensions, set by SessionManagerLayer.
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::RedirectToLogin(role))?;

    // A logged-in milkman hitting a customer page gets the customer login,
    // not a confusing 403.
    if user.role != role {
        return Err(AuthRejection::RedirectToLogin(role));
    }

    Ok(user)
}

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, Role::Admin).await.map(Self)
    }
}

/// Extractor that requires a logged-in milkman.
pub struct RequireMilkman(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireMilkman
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, Role::Milkman).await.map(Self)
    }
}

/// Extractor that requires a logged-in customer.
pub struct RequireCustomer(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, Role::Customer).await.map(Self)
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(session_keys::CURRENT_USER).await?;
    Ok(())
}
