//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use milkround_core::Role;

/// Session-stored identity.
///
/// Minimal data stored in the session to identify the logged-in account and
/// its role. The ID refers to the role's own table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Row ID in the role's table.
    pub id: i64,
    /// The account's role; gates which dashboards are reachable.
    pub role: Role,
    /// Display name.
    pub name: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
