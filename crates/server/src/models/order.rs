//! Order, delivery, and calendar projection models.

use chrono::NaiveDate;
use sqlx::FromRow;

use milkround_core::{CustomerId, OrderId, Quantity};

/// A date-specific order. At most one exists per (customer, delivery date).
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub delivery_date: NaiveDate,
    pub brand: String,
    pub quantity: Quantity,
    pub notes: String,
}

/// The resolved brand/quantity/notes for a customer and date, after applying
/// the explicit-order-over-default-preference rule.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveOrder {
    pub brand: String,
    pub quantity: Quantity,
    pub notes: String,
    /// Whether a date-specific order produced this, as opposed to the
    /// customer's default preference.
    pub explicit: bool,
}

/// Delivery status of a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    NotOrdered,
    Ordered,
    Delivered,
}

impl DayStatus {
    /// Human-readable label for templates.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotOrdered => "not ordered",
            Self::Ordered => "ordered",
            Self::Delivered => "delivered",
        }
    }

    /// CSS class hook for templates.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::NotOrdered => "day-not-ordered",
            Self::Ordered => "day-ordered",
            Self::Delivered => "day-delivered",
        }
    }
}

/// One day of the month projection.
#[derive(Debug, Clone)]
pub struct DaySlot {
    /// Day of month, 1-based.
    pub day: u32,
    pub date: NaiveDate,
    pub status: DayStatus,
    /// The explicit order for this date, if any.
    pub order: Option<Order>,
}
