//! Account models for the three roles.
//!
//! Password hashes never appear on these structs; the repositories return
//! them separately to the auth service only.

use chrono::NaiveDateTime;
use sqlx::FromRow;

use milkround_core::{AdminId, CustomerId, Email, MilkmanCode, MilkmanId, Phone, Quantity};

/// A farm administrator.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: AdminId,
    pub name: String,
    pub email: Email,
    pub farm_name: String,
    pub created_at: NaiveDateTime,
}

/// A delivery person.
#[derive(Debug, Clone, FromRow)]
pub struct Milkman {
    pub id: MilkmanId,
    pub name: String,
    pub phone: Phone,
    /// The 6-digit code customers use to link to this milkman.
    pub code: MilkmanCode,
    pub created_at: NaiveDateTime,
}

/// A customer, linked to exactly one milkman via `milkman_code`.
#[derive(Debug, Clone, FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub phone: Phone,
    pub address: String,
    pub milkman_code: MilkmanCode,
    /// Fallback brand applied on dates with no explicit order.
    pub default_brand: String,
    /// Fallback quantity applied on dates with no explicit order.
    pub default_quantity: Quantity,
    pub created_at: NaiveDateTime,
}
