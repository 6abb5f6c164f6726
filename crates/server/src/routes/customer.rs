//! Customer route handlers: registration, login, preferences, orders,
//! calendar, and profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use tower_sessions::Session;

use milkround_core::{CustomerId, Role};

use crate::db::CustomerRepository;
use crate::error::AppError;
use crate::middleware::{RequireCustomer, set_current_user};
use crate::models::{CurrentUser, Customer, DaySlot, Order};
use crate::routes::{admin::LoginTemplate, message_for, redirect_with_error};
use crate::services::{AuthService, CalendarService, DirectoryService, OrderService};
use crate::state::AppState;

// =============================================================================
// Form and Query Types
// =============================================================================

/// Customer registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub milkman_code: String,
    pub password: String,
}

/// Customer login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub phone: String,
    pub password: String,
}

/// Default preference form data.
#[derive(Debug, Deserialize)]
pub struct PreferencesForm {
    pub brand: String,
    pub quantity: String,
}

/// Dated order form data. Date and quantity stay strings so validation
/// failures redirect with an error code instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct OrderForm {
    pub date: String,
    pub brand: String,
    pub quantity: String,
    #[serde(default)]
    pub notes: String,
}

/// Order cancellation form data.
#[derive(Debug, Deserialize)]
pub struct CancelForm {
    pub date: String,
}

/// Milkman switch form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub milkman_code: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Query parameters for the calendar page.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Customer registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register_customer.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Customer dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "customer/dashboard.html")]
pub struct DashboardTemplate {
    pub customer: Customer,
    pub upcoming: Vec<Order>,
}

/// Default preference page template.
#[derive(Template, WebTemplate)]
#[template(path = "customer/preferences.html")]
pub struct PreferencesTemplate {
    pub customer: Customer,
    pub error: Option<String>,
}

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "customer/orders.html")]
pub struct OrdersTemplate {
    pub upcoming: Vec<Order>,
    pub error: Option<String>,
}

/// Calendar page template.
#[derive(Template, WebTemplate)]
#[template(path = "customer/calendar.html")]
pub struct CalendarTemplate {
    pub year: i32,
    pub month: u32,
    pub slots: Vec<DaySlot>,
    pub prev_year: i32,
    pub prev_month: u32,
    pub next_year: i32,
    pub next_month: u32,
    pub error: Option<String>,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "customer/profile.html")]
pub struct ProfileTemplate {
    pub customer: Customer,
    pub milkman_name: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Registration and Login
// =============================================================================

/// Display the customer registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: message_for(query.error.as_deref()),
    }
}

/// Handle customer registration form submission.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    let customer = match auth
        .register_customer(
            &form.name,
            &form.phone,
            &form.address,
            &form.milkman_code,
            &form.password,
        )
        .await
    {
        Ok(customer) => customer,
        Err(e) => {
            return match e.user_code() {
                Some(code) => {
                    tracing::warn!("Customer registration rejected: {}", e);
                    Ok(redirect_with_error("/customer/register", code))
                }
                None => Err(e.into()),
            };
        }
    };

    let user = CurrentUser {
        id: customer.id.as_i64(),
        role: Role::Customer,
        name: customer.name,
    };
    set_current_user(&session, &user).await?;

    Ok(Redirect::to("/customer").into_response())
}

/// Display the customer login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        role_name: "Customer",
        action: "/customer/login",
        register_path: "/customer/register",
        identifier_label: "Phone",
        identifier_name: "phone",
        error: message_for(query.error.as_deref()),
    }
}

/// Handle customer login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    let customer = match auth.login_customer(&form.phone, &form.password).await {
        Ok(customer) => customer,
        Err(e) => {
            return match e.user_code() {
                Some(code) => {
                    tracing::warn!("Customer login failed: {}", e);
                    Ok(redirect_with_error("/customer/login", code))
                }
                None => Err(e.into()),
            };
        }
    };

    let user = CurrentUser {
        id: customer.id.as_i64(),
        role: Role::Customer,
        name: customer.name,
    };
    set_current_user(&session, &user).await?;

    Ok(Redirect::to("/customer").into_response())
}

// =============================================================================
// Dashboard and Preferences
// =============================================================================

async fn load_customer(state: &AppState, user_id: i64) -> Result<Customer, AppError> {
    CustomerRepository::new(state.pool())
        .get_by_id(CustomerId::new(user_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("customer {user_id}")))
}

/// Display the customer dashboard: defaults and upcoming orders.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
) -> Result<DashboardTemplate, AppError> {
    let customer = load_customer(&state, user.id).await?;
    let upcoming = OrderService::new(state.pool())
        .upcoming_orders(customer.id, Local::now().date_naive())
        .await?;

    Ok(DashboardTemplate { customer, upcoming })
}

/// Display the default preference form.
pub async fn preferences_page(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Query(query): Query<MessageQuery>,
) -> Result<PreferencesTemplate, AppError> {
    let customer = load_customer(&state, user.id).await?;

    Ok(PreferencesTemplate {
        customer,
        error: message_for(query.error.as_deref()),
    })
}

/// Handle default preference form submission.
pub async fn update_preferences(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Form(form): Form<PreferencesForm>,
) -> Result<Response, AppError> {
    let orders = OrderService::new(state.pool());

    match orders
        .set_default_preference(CustomerId::new(user.id), &form.brand, &form.quantity)
        .await
    {
        Ok(()) => Ok(Redirect::to("/customer").into_response()),
        Err(e) => match e.user_code() {
            Some(code) => Ok(redirect_with_error("/customer/preferences", code)),
            None => Err(e.into()),
        },
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Display upcoming orders and the order form.
pub async fn orders_page(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Query(query): Query<MessageQuery>,
) -> Result<OrdersTemplate, AppError> {
    let upcoming = OrderService::new(state.pool())
        .upcoming_orders(CustomerId::new(user.id), Local::now().date_naive())
        .await?;

    Ok(OrdersTemplate {
        upcoming,
        error: message_for(query.error.as_deref()),
    })
}

/// Create the order for a date, or overwrite the existing one.
pub async fn upsert_order(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Form(form): Form<OrderForm>,
) -> Result<Response, AppError> {
    let Ok(date) = form.date.parse::<NaiveDate>() else {
        return Ok(redirect_with_error("/customer/orders", "date"));
    };

    let orders = OrderService::new(state.pool());

    match orders
        .upsert_order(
            CustomerId::new(user.id),
            date,
            &form.brand,
            &form.quantity,
            &form.notes,
        )
        .await
    {
        Ok(_) => Ok(Redirect::to("/customer/orders").into_response()),
        Err(e) => match e.user_code() {
            Some(code) => Ok(redirect_with_error("/customer/orders", code)),
            None => Err(e.into()),
        },
    }
}

/// Cancel a future order. Today's order is behind the cutoff.
pub async fn cancel_order(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Form(form): Form<CancelForm>,
) -> Result<Response, AppError> {
    let Ok(date) = form.date.parse::<NaiveDate>() else {
        return Ok(redirect_with_error("/customer/orders", "date"));
    };

    let orders = OrderService::new(state.pool());
    let today = Local::now().date_naive();

    match orders
        .cancel_order(CustomerId::new(user.id), date, today)
        .await
    {
        Ok(()) => Ok(Redirect::to("/customer/orders").into_response()),
        Err(e) => match e.user_code() {
            Some(code) => Ok(redirect_with_error("/customer/orders", code)),
            None => Err(e.into()),
        },
    }
}

// =============================================================================
// Calendar
// =============================================================================

/// Display the month projection, defaulting to the current month.
pub async fn calendar_page(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, AppError> {
    let today = Local::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let calendar = CalendarService::new(state.pool());
    let slots = match calendar
        .project_month(CustomerId::new(user.id), year, month, today)
        .await
    {
        Ok(slots) => slots,
        Err(e) => {
            return match e.user_code() {
                Some(code) => Ok(redirect_with_error("/customer/calendar", code)),
                None => Err(e.into()),
            };
        }
    };

    let (prev_year, prev_month) = if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    Ok(CalendarTemplate {
        year,
        month,
        slots,
        prev_year,
        prev_month,
        next_year,
        next_month,
        error: message_for(query.error.as_deref()),
    }
    .into_response())
}

// =============================================================================
// Profile
// =============================================================================

/// Display the profile page with the linked milkman.
pub async fn profile_page(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Query(query): Query<MessageQuery>,
) -> Result<ProfileTemplate, AppError> {
    let customer = load_customer(&state, user.id).await?;

    let milkman_name = crate::db::MilkmanRepository::new(state.pool())
        .get_by_code(&customer.milkman_code)
        .await?
        .map(|m| m.name);

    Ok(ProfileTemplate {
        customer,
        milkman_name,
        error: message_for(query.error.as_deref()),
    })
}

/// Switch to another milkman by code.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let directory = DirectoryService::new(state.pool());

    match directory
        .reassign_customer(CustomerId::new(user.id), &form.milkman_code)
        .await
    {
        Ok(()) => Ok(Redirect::to("/customer/profile").into_response()),
        Err(e) => match e.user_code() {
            Some(code) => Ok(redirect_with_error("/customer/profile", code)),
            None => Err(e.into()),
        },
    }
}
