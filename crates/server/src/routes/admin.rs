//! Admin route handlers: registration, login, and the oversight dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use milkround_core::Role;

use crate::db::{CustomerRepository, MilkmanRepository};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, set_current_user};
use crate::models::{Customer, CurrentUser, Milkman};
use crate::routes::{message_for, redirect_with_error};
use crate::services::AuthService;
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Admin registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub farm_name: String,
    pub password: String,
}

/// Admin login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Admin registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register_admin.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Login page template, shared across roles.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub role_name: &'static str,
    pub action: &'static str,
    pub register_path: &'static str,
    pub identifier_label: &'static str,
    pub identifier_name: &'static str,
    pub error: Option<String>,
}

/// One milkman row on the admin dashboard, with their roster size.
pub struct MilkmanRow {
    pub milkman: Milkman,
    pub roster_size: usize,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin_name: String,
    pub milkmen: Vec<MilkmanRow>,
    pub customers: Vec<Customer>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the admin registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: message_for(query.error.as_deref()),
    }
}

/// Handle admin registration form submission.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    let admin = match auth
        .register_admin(&form.name, &form.email, &form.farm_name, &form.password)
        .await
    {
        Ok(admin) => admin,
        Err(e) => {
            return match e.user_code() {
                Some(code) => {
                    tracing::warn!("Admin registration rejected: {}", e);
                    Ok(redirect_with_error("/admin/register", code))
                }
                None => Err(e.into()),
            };
        }
    };

    let user = CurrentUser {
        id: admin.id.as_i64(),
        role: Role::Admin,
        name: admin.name,
    };
    set_current_user(&session, &user).await?;

    Ok(Redirect::to("/admin").into_response())
}

/// Display the admin login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        role_name: "Admin",
        action: "/admin/login",
        register_path: "/admin/register",
        identifier_label: "Email",
        identifier_name: "email",
        error: message_for(query.error.as_deref()),
    }
}

/// Handle admin login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    let admin = match auth.login_admin(&form.email, &form.password).await {
        Ok(admin) => admin,
        Err(e) => {
            return match e.user_code() {
                Some(code) => {
                    tracing::warn!("Admin login failed: {}", e);
                    Ok(redirect_with_error("/admin/login", code))
                }
                None => Err(e.into()),
            };
        }
    };

    let user = CurrentUser {
        id: admin.id.as_i64(),
        role: Role::Admin,
        name: admin.name,
    };
    set_current_user(&session, &user).await?;

    Ok(Redirect::to("/admin").into_response())
}

/// Display the admin dashboard: every milkman and every customer.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
) -> Result<DashboardTemplate, AppError> {
    let customers = CustomerRepository::new(state.pool()).list().await?;
    let milkmen = MilkmanRepository::new(state.pool())
        .list()
        .await?
        .into_iter()
        .map(|milkman| {
            let roster_size = customers
                .iter()
                .filter(|c| c.milkman_code == milkman.code)
                .count();
            MilkmanRow {
                milkman,
                roster_size,
            }
        })
        .collect();

    Ok(DashboardTemplate {
        admin_name: user.name,
        milkmen,
        customers,
    })
}
