//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>` and
//! translate user-recoverable service errors into form redirects before they
//! reach this type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CalendarError, DirectoryError, OrderError};

/// Application-level error type for the delivery service.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication or registration failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Roster or code operation failed.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Calendar operation failed.
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => true,
            Self::Auth(err) => err.user_code().is_none(),
            Self::Directory(err) => err.user_code().is_none(),
            Self::Order(err) => err.user_code().is_none(),
            Self::Calendar(err) => err.user_code().is_none(),
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::DuplicateIdentity => StatusCode::CONFLICT,
                AuthError::MissingField(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidPhone(_)
                | AuthError::WeakPassword(_)
                | AuthError::UnknownMilkmanCode => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Directory(err) => match err {
                DirectoryError::UnknownMilkmanCode => StatusCode::BAD_REQUEST,
                DirectoryError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Order(err) => match err {
                OrderError::OrderNotFound => StatusCode::NOT_FOUND,
                OrderError::MissingField(_)
                | OrderError::InvalidQuantity(_)
                | OrderError::CutoffViolation => StatusCode::BAD_REQUEST,
                OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Calendar(err) => match err {
                CalendarError::InvalidMonth => StatusCode::BAD_REQUEST,
                CalendarError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            match &self {
                Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials".to_string(),
                _ => self.to_string(),
            }
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
