//! Milkman route handlers: registration, login, dashboard, and delivery
//! recording.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tower_sessions::Session;

use milkround_core::{CustomerId, MilkmanId, Role};

use crate::db::{CustomerRepository, MilkmanRepository};
use crate::error::AppError;
use crate::middleware::{RequireMilkman, set_current_user};
use crate::models::{CurrentUser, Customer, Milkman};
use crate::routes::{admin::LoginTemplate, message_for, redirect_with_error};
use crate::services::{AuthService, CalendarService, DirectoryService, ManifestLine};
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Milkman registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub phone: String,
    pub password: String,
}

/// Milkman login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub phone: String,
    pub password: String,
}

/// Delivery recording form data. The date stays a string so a malformed
/// value redirects with an error instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct DeliveryForm {
    pub customer_id: i64,
    pub date: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Milkman registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register_milkman.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Milkman dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "milkman/dashboard.html")]
pub struct DashboardTemplate {
    pub milkman: Milkman,
    pub roster: Vec<Customer>,
    pub manifest_date: NaiveDate,
    pub manifest: Vec<ManifestLine>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the milkman registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: message_for(query.error.as_deref()),
    }
}

/// Handle milkman registration form submission.
///
/// The 6-digit linking code is generated server-side and shown on the
/// dashboard after login.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    let milkman = match auth
        .register_milkman(&form.name, &form.phone, &form.password)
        .await
    {
        Ok(milkman) => milkman,
        Err(e) => {
            return match e.user_code() {
                Some(code) => {
                    tracing::warn!("Milkman registration rejected: {}", e);
                    Ok(redirect_with_error("/milkman/register", code))
                }
                None => Err(e.into()),
            };
        }
    };

    let user = CurrentUser {
        id: milkman.id.as_i64(),
        role: Role::Milkman,
        name: milkman.name,
    };
    set_current_user(&session, &user).await?;

    Ok(Redirect::to("/milkman").into_response())
}

/// Display the milkman login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        role_name: "Milkman",
        action: "/milkman/login",
        register_path: "/milkman/register",
        identifier_label: "Phone",
        identifier_name: "phone",
        error: message_for(query.error.as_deref()),
    }
}

/// Handle milkman login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    let milkman = match auth.login_milkman(&form.phone, &form.password).await {
        Ok(milkman) => milkman,
        Err(e) => {
            return match e.user_code() {
                Some(code) => {
                    tracing::warn!("Milkman login failed: {}", e);
                    Ok(redirect_with_error("/milkman/login", code))
                }
                None => Err(e.into()),
            };
        }
    };

    let user = CurrentUser {
        id: milkman.id.as_i64(),
        role: Role::Milkman,
        name: milkman.name,
    };
    set_current_user(&session, &user).await?;

    Ok(Redirect::to("/milkman").into_response())
}

/// Display the milkman dashboard: linking code, roster, and tomorrow's
/// delivery manifest.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireMilkman(user): RequireMilkman,
    Query(query): Query<MessageQuery>,
) -> Result<DashboardTemplate, AppError> {
    let milkman = MilkmanRepository::new(state.pool())
        .get_by_id(MilkmanId::new(user.id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("milkman {}", user.id)))?;

    let directory = DirectoryService::new(state.pool());
    let roster = directory.roster(&milkman.code).await?;

    let manifest_date = Local::now()
        .date_naive()
        .succ_opt()
        .ok_or_else(|| AppError::Internal("date overflow".to_string()))?;
    let manifest = directory.manifest(&milkman.code, manifest_date).await?;

    Ok(DashboardTemplate {
        milkman,
        roster,
        manifest_date,
        manifest,
        error: message_for(query.error.as_deref()),
    })
}

/// Record that a delivery was made to a customer on a date.
///
/// The customer must be on the logged-in milkman's round; an unknown id or
/// another milkman's customer redirects back with an error.
pub async fn record_delivery(
    State(state): State<AppState>,
    RequireMilkman(user): RequireMilkman,
    Form(form): Form<DeliveryForm>,
) -> Result<Response, AppError> {
    let Ok(date) = form.date.parse::<NaiveDate>() else {
        return Ok(redirect_with_error("/milkman", "date"));
    };

    let milkman = MilkmanRepository::new(state.pool())
        .get_by_id(MilkmanId::new(user.id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("milkman {}", user.id)))?;

    let customer = CustomerRepository::new(state.pool())
        .get_by_id(CustomerId::new(form.customer_id))
        .await?;
    let Some(customer) = customer.filter(|c| c.milkman_code == milkman.code) else {
        tracing::warn!(
            customer_id = form.customer_id,
            milkman_id = user.id,
            "Delivery rejected: customer not on this round"
        );
        return Ok(redirect_with_error("/milkman", "roster"));
    };

    CalendarService::new(state.pool())
        .record_delivery(customer.id, date)
        .await?;

    Ok(Redirect::to("/milkman").into_response())
}
