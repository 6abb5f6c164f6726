//! Request middleware: session layer and role-gating extractors.

pub mod auth;
pub mod session;

pub use auth::{
    RequireAdmin, RequireCustomer, RequireMilkman, clear_current_user, set_current_user,
};
pub use session::create_session_layer;
