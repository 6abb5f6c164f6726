//! HTTP route handlers for the delivery service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (pings the database)
//! POST /logout                  - Logout (any role)
//!
//! # Admin
//! GET  /admin/register          - Admin registration page
//! POST /admin/register          - Register action
//! GET  /admin/login             - Admin login page
//! POST /admin/login             - Login action
//! GET  /admin                   - Dashboard: all milkmen and customers
//!
//! # Milkman
//! GET  /milkman/register        - Milkman registration page
//! POST /milkman/register        - Register action (code is generated)
//! GET  /milkman/login           - Milkman login page
//! POST /milkman/login           - Login action
//! GET  /milkman                 - Dashboard: code, roster, tomorrow's manifest
//! POST /milkman/deliveries      - Record a delivery as made
//!
//! # Customer
//! GET  /customer/register       - Customer registration page
//! POST /customer/register       - Register action (requires milkman code)
//! GET  /customer/login          - Customer login page
//! POST /customer/login          - Login action
//! GET  /customer                - Dashboard: defaults and upcoming orders
//! GET  /customer/preferences    - Default preference form
//! POST /customer/preferences    - Update default brand/quantity
//! GET  /customer/orders         - Upcoming orders and order form
//! POST /customer/orders         - Create or overwrite a dated order
//! POST /customer/orders/cancel  - Cancel a future order
//! GET  /customer/calendar       - Month projection (?year=&month=)
//! GET  /customer/profile        - Profile and milkman link
//! POST /customer/profile        - Switch to another milkman by code
//! ```

pub mod admin;
pub mod customer;
pub mod home;
pub mod milkman;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::middleware::clear_current_user;
use crate::state::AppState;

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/register", get(admin::register_page).post(admin::register))
        .route("/login", get(admin::login_page).post(admin::login))
}

/// Create the milkman routes router.
pub fn milkman_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(milkman::dashboard))
        .route(
            "/register",
            get(milkman::register_page).post(milkman::register),
        )
        .route("/login", get(milkman::login_page).post(milkman::login))
        .route("/deliveries", post(milkman::record_delivery))
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customer::dashboard))
        .route(
            "/register",
            get(customer::register_page).post(customer::register),
        )
        .route("/login", get(customer::login_page).post(customer::login))
        .route(
            "/preferences",
            get(customer::preferences_page).post(customer::update_preferences),
        )
        .route(
            "/orders",
            get(customer::orders_page).post(customer::upsert_order),
        )
        .route("/orders/cancel", post(customer::cancel_order))
        .route("/calendar", get(customer::calendar_page))
        .route(
            "/profile",
            get(customer::profile_page).post(customer::update_profile),
        )
}

/// Create all routes for the service.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/logout", post(logout))
        .nest("/admin", admin_routes())
        .nest("/milkman", milkman_routes())
        .nest("/customer", customer_routes())
}

/// Liveness check.
async fn health() -> &'static str {
    "OK"
}

/// Readiness check: pings the database.
async fn ready(State(state): State<AppState>) -> Response {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
    {
        Ok(_) => (StatusCode::OK, "OK").into_response(),
        Err(e) => {
            tracing::error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable").into_response()
        }
    }
}

/// Handle logout for any role.
///
/// Clears the user and destroys the session.
async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/").into_response()
}

/// Redirect back to `page` with an error code in the query string.
pub(crate) fn redirect_with_error(page: &str, code: &str) -> Response {
    Redirect::to(&format!("{page}?error={code}")).into_response()
}

/// Map a redirect error code to the message shown on the page.
pub(crate) fn message_for(code: Option<&str>) -> Option<String> {
    let message = match code? {
        "missing" => "All fields are required.",
        "email" => "That email address does not look right.",
        "phone" => "That phone number does not look right.",
        "weak_password" => "Password must be at least 8 characters.",
        "duplicate" => "An account with those details already exists.",
        "credentials" => "Invalid credentials.",
        "unknown_code" => "No milkman has that code.",
        "quantity" => "Quantity must be a positive number.",
        "date" => "Enter a valid date (YYYY-MM-DD).",
        "order_not_found" => "No order exists for that date.",
        "roster" => "That customer is not on your round.",
        "cutoff" => "Orders for today or past dates cannot be cancelled.",
        "month" => "That is not a valid calendar month.",
        "session" => "Something went wrong with your session, please try again.",
        _ => "Something went wrong, please try again.",
    };
    Some(message.to_string())
}
