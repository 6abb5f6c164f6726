//! Milkround server library.
//!
//! This crate provides the web application as a library, allowing it to be
//! started in-process by the integration tests and the binary alike.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router with the session layer attached.
///
/// Sentry layers are added by the binary on top of this; tests drive the
/// returned router directly.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session store cannot run its migration.
pub async fn app(state: AppState) -> Result<Router, sqlx::Error> {
    let session_layer = middleware::create_session_layer(state.pool(), state.config()).await?;

    Ok(Router::new()
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .layer(session_layer)
        .with_state(state))
}
