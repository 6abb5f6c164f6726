//! Order and preference resolution service.
//!
//! Owns the default-preference fallback rule and the cancellation cutoff.
//! "Today" is always passed in by the caller so the cutoff is testable.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use thiserror::Error;

use milkround_core::{CustomerId, Quantity, QuantityError};

use crate::db::{CustomerRepository, OrderRepository, RepositoryError};
use crate::models::{Customer, EffectiveOrder, Order};

/// Errors that can occur in order and preference operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A required form field was empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The quantity is not a positive number.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// No order exists for the (customer, date) key.
    #[error("order not found")]
    OrderNotFound,

    /// The order's date is today or in the past; the cancellation cutoff
    /// (end of the current calendar day) has passed.
    #[error("orders for today or past dates cannot be cancelled")]
    CutoffViolation,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl OrderError {
    /// Short code for user-recoverable failures, used in form redirects.
    #[must_use]
    pub const fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(_) => Some("missing"),
            Self::InvalidQuantity(_) => Some("quantity"),
            Self::OrderNotFound => Some("order_not_found"),
            Self::CutoffViolation => Some("cutoff"),
            Self::Repository(_) => None,
        }
    }
}

/// Order and preference service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    customers: CustomerRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            customers: CustomerRepository::new(pool),
        }
    }

    /// Overwrite a customer's fallback brand/quantity preference.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` or `InvalidQuantity` for user-input failures.
    pub async fn set_default_preference(
        &self,
        customer_id: CustomerId,
        brand: &str,
        quantity: &str,
    ) -> Result<(), OrderError> {
        let brand = require(brand, "brand")?;
        let quantity = Quantity::parse(quantity)?;

        self.customers
            .set_default_preference(customer_id, brand, quantity)
            .await?;

        Ok(())
    }

    /// Create the order for (customer, date), or overwrite the existing one
    /// in place.
    ///
    /// Past dates are deliberately accepted here even though cancellation
    /// refuses them; only cancellation is cutoff-guarded.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` or `InvalidQuantity` for user-input failures.
    pub async fn upsert_order(
        &self,
        customer_id: CustomerId,
        date: NaiveDate,
        brand: &str,
        quantity: &str,
        notes: &str,
    ) -> Result<Order, OrderError> {
        let brand = require(brand, "brand")?;
        let quantity = Quantity::parse(quantity)?;

        let order = self
            .orders
            .upsert(customer_id, date, brand, quantity, notes.trim())
            .await?;

        Ok(order)
    }

    /// Cancel the order for (customer, date).
    ///
    /// The cutoff is the end of the current calendar day: any date on or
    /// before `today` fails before the store is touched.
    ///
    /// # Errors
    ///
    /// Returns `CutoffViolation` for dates on or before `today`, and
    /// `OrderNotFound` if no order exists for a future date.
    pub async fn cancel_order(
        &self,
        customer_id: CustomerId,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), OrderError> {
        if date <= today {
            return Err(OrderError::CutoffViolation);
        }

        if !self.orders.delete(customer_id, date).await? {
            return Err(OrderError::OrderNotFound);
        }

        Ok(())
    }

    /// Resolve the effective order for a customer and date: the explicit
    /// order if one exists, otherwise the default preference with empty
    /// notes.
    ///
    /// # Errors
    ///
    /// Returns `Repository` wrapped errors if the lookup fails.
    pub async fn resolve_effective_order(
        &self,
        customer: &Customer,
        date: NaiveDate,
    ) -> Result<EffectiveOrder, OrderError> {
        let effective = match self.orders.get(customer.id, date).await? {
            Some(order) => EffectiveOrder {
                brand: order.brand,
                quantity: order.quantity,
                notes: order.notes,
                explicit: true,
            },
            None => EffectiveOrder {
                brand: customer.default_brand.clone(),
                quantity: customer.default_quantity,
                notes: String::new(),
                explicit: false,
            },
        };

        Ok(effective)
    }

    /// A customer's dated orders on or after `from`, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `Repository` wrapped errors if the query fails.
    pub async fn upcoming_orders(
        &self,
        customer_id: CustomerId,
        from: NaiveDate,
    ) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.list_from(customer_id, from).await?;
        Ok(orders)
    }
}

/// Reject empty required fields, trimming whitespace.
fn require<'s>(value: &'s str, field: &'static str) -> Result<&'s str, OrderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OrderError::MissingField(field));
    }
    Ok(trimmed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::services::auth::AuthService;

    async fn seed_customer(pool: &SqlitePool) -> Customer {
        let auth = AuthService::new(pool);
        let milkman = auth
            .register_milkman("M", "9876543210", "password-1")
            .await
            .unwrap();
        let customer = auth
            .register_customer(
                "C",
                "9123456780",
                "12 Dairy Lane",
                milkman.code.as_str(),
                "password-1",
            )
            .await
            .unwrap();
        // Default preference from the worked scenario: Regular, 1 litre.
        OrderService::new(pool)
            .set_default_preference(customer.id, "Regular", "1")
            .await
            .unwrap();
        CustomerRepository::new(pool)
            .get_by_id(customer.id)
            .await
            .unwrap()
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn explicit_order_wins_over_default_preference() {
        let pool = test_pool().await;
        let orders = OrderService::new(&pool);
        let customer = seed_customer(&pool).await;

        orders
            .upsert_order(customer.id, date(2024, 3, 10), "Premium", "2", "")
            .await
            .unwrap();

        let on_order_day = orders
            .resolve_effective_order(&customer, date(2024, 3, 10))
            .await
            .unwrap();
        assert_eq!(on_order_day.brand, "Premium");
        assert_eq!(on_order_day.quantity.litres(), 2.0);
        assert_eq!(on_order_day.notes, "");
        assert!(on_order_day.explicit);

        let day_after = orders
            .resolve_effective_order(&customer, date(2024, 3, 11))
            .await
            .unwrap();
        assert_eq!(day_after.brand, "Regular");
        assert_eq!(day_after.quantity.litres(), 1.0);
        assert_eq!(day_after.notes, "");
        assert!(!day_after.explicit);
    }

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let pool = test_pool().await;
        let orders = OrderService::new(&pool);
        let customer = seed_customer(&pool).await;
        let d = date(2024, 3, 10);

        let first = orders
            .upsert_order(customer.id, d, "Premium", "2", "")
            .await
            .unwrap();
        let second = orders
            .upsert_order(customer.id, d, "Toned", "1.5", "leave at gate")
            .await
            .unwrap();

        // Same key, overwritten fields.
        assert_eq!(first.id, second.id);
        assert_eq!(second.brand, "Toned");
        assert_eq!(second.quantity.litres(), 1.5);
        assert_eq!(second.notes, "leave at gate");
    }

    #[tokio::test]
    async fn upsert_accepts_past_dates() {
        // Matches the source behaviour: only cancellation is date-gated.
        let pool = test_pool().await;
        let orders = OrderService::new(&pool);
        let customer = seed_customer(&pool).await;

        orders
            .upsert_order(customer.id, date(2020, 1, 1), "Regular", "1", "")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn invalid_quantities_are_rejected() {
        let pool = test_pool().await;
        let orders = OrderService::new(&pool);
        let customer = seed_customer(&pool).await;

        for bad in ["0", "-2", "two"] {
            let err = orders
                .upsert_order(customer.id, date(2024, 3, 10), "Regular", bad, "")
                .await
                .unwrap_err();
            assert!(matches!(err, OrderError::InvalidQuantity(_)), "{bad}");
        }

        let err = orders
            .set_default_preference(customer.id, "Regular", "-1")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity(_)));
    }

    #[tokio::test]
    async fn cancel_respects_the_cutoff() {
        let pool = test_pool().await;
        let orders = OrderService::new(&pool);
        let customer = seed_customer(&pool).await;
        let today = date(2024, 3, 10);

        orders
            .upsert_order(customer.id, date(2024, 3, 10), "Premium", "2", "")
            .await
            .unwrap();
        orders
            .upsert_order(customer.id, date(2024, 3, 11), "Premium", "2", "")
            .await
            .unwrap();

        // Today and the past are behind the cutoff.
        let err = orders
            .cancel_order(customer.id, date(2024, 3, 10), today)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::CutoffViolation));
        let err = orders
            .cancel_order(customer.id, date(2024, 3, 9), today)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::CutoffViolation));

        // Strictly-future dates cancel and remove the record.
        orders
            .cancel_order(customer.id, date(2024, 3, 11), today)
            .await
            .unwrap();
        let resolved = orders
            .resolve_effective_order(&customer, date(2024, 3, 11))
            .await
            .unwrap();
        assert!(!resolved.explicit);

        // A second cancellation finds nothing.
        let err = orders
            .cancel_order(customer.id, date(2024, 3, 11), today)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound));
    }
}
