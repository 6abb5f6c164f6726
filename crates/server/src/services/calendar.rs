//! Monthly delivery calendar projection.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;
use thiserror::Error;

use milkround_core::CustomerId;

use crate::db::{DeliveryRepository, OrderRepository, RepositoryError};
use crate::models::{DaySlot, DayStatus};

/// Errors that can occur while projecting or updating the calendar.
#[derive(Debug, Error)]
pub enum CalendarError {
    /// Year/month does not name a real calendar month.
    #[error("invalid calendar month")]
    InvalidMonth,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl CalendarError {
    /// Short code for user-recoverable failures, used in form redirects.
    #[must_use]
    pub const fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidMonth => Some("month"),
            Self::Repository(_) => None,
        }
    }
}

/// Calendar projection service.
pub struct CalendarService<'a> {
    orders: OrderRepository<'a>,
    deliveries: DeliveryRepository<'a>,
}

impl<'a> CalendarService<'a> {
    /// Create a new calendar service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            deliveries: DeliveryRepository::new(pool),
        }
    }

    /// Project one calendar month for a customer, one slot per day.
    ///
    /// A day is `Delivered` when a delivery record exists, or as a fallback
    /// when an order exists for a date before `today` without a record.
    /// Otherwise an order makes the day `Ordered`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMonth` when year/month is out of range.
    pub async fn project_month(
        &self,
        customer_id: CustomerId,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<Vec<DaySlot>, CalendarError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth)?;
        let last = last_day_of_month(year, month).ok_or(CalendarError::InvalidMonth)?;

        let orders: HashMap<NaiveDate, _> = self
            .orders
            .list_in_range(customer_id, first, last)
            .await?
            .into_iter()
            .map(|order| (order.delivery_date, order))
            .collect();
        let delivered: HashSet<NaiveDate> = self
            .deliveries
            .dates_in_range(customer_id, first, last)
            .await?
            .into_iter()
            .collect();

        let slots = first
            .iter_days()
            .take_while(|d| *d <= last)
            .map(|date| {
                let order = orders.get(&date).cloned();
                let status = if delivered.contains(&date)
                    || (order.is_some() && date < today)
                {
                    DayStatus::Delivered
                } else if order.is_some() {
                    DayStatus::Ordered
                } else {
                    DayStatus::NotOrdered
                };
                DaySlot {
                    day: date.day(),
                    date,
                    status,
                    order,
                }
            })
            .collect();

        Ok(slots)
    }

    /// Record that a delivery was made. Recording the same day twice is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `Repository` wrapped errors if the insert fails.
    pub async fn record_delivery(
        &self,
        customer_id: CustomerId,
        date: NaiveDate,
    ) -> Result<(), CalendarError> {
        self.deliveries.record(customer_id, date).await?;
        Ok(())
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::services::auth::AuthService;
    use crate::services::orders::OrderService;

    async fn seed_customer_id(pool: &SqlitePool) -> CustomerId {
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
        customer.id
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn month_lengths_are_respected() {
        let pool = test_pool().await;
        let calendar = CalendarService::new(&pool);
        let customer_id = seed_customer_id(&pool).await;
        let today = date(2024, 6, 1);

        let december = calendar
            .project_month(customer_id, 2024, 12, today)
            .await
            .unwrap();
        assert_eq!(december.len(), 31);
        assert_eq!(december[0].date, date(2024, 12, 1));
        assert_eq!(december[30].date, date(2024, 12, 31));

        // 2024 is a leap year.
        let february = calendar
            .project_month(customer_id, 2024, 2, today)
            .await
            .unwrap();
        assert_eq!(february.len(), 29);

        assert!(matches!(
            calendar.project_month(customer_id, 2024, 13, today).await,
            Err(CalendarError::InvalidMonth)
        ));
    }

    #[tokio::test]
    async fn statuses_follow_orders_deliveries_and_today() {
        let pool = test_pool().await;
        let calendar = CalendarService::new(&pool);
        let orders = OrderService::new(&pool);
        let customer_id = seed_customer_id(&pool).await;
        let today = date(2024, 3, 15);

        // Past order with no record still shows as delivered.
        orders
            .upsert_order(customer_id, date(2024, 3, 10), "Regular", "1", "")
            .await
            .unwrap();
        // Future order.
        orders
            .upsert_order(customer_id, date(2024, 3, 20), "Premium", "2", "")
            .await
            .unwrap();
        // Delivery record without an order, e.g. a standing default run.
        calendar
            .record_delivery(customer_id, date(2024, 3, 12))
            .await
            .unwrap();

        let month = calendar
            .project_month(customer_id, 2024, 3, today)
            .await
            .unwrap();
        assert_eq!(month.len(), 31);

        let by_day = |d: u32| &month[(d - 1) as usize];
        assert_eq!(by_day(10).status, DayStatus::Delivered);
        assert!(by_day(10).order.is_some());
        assert_eq!(by_day(12).status, DayStatus::Delivered);
        assert!(by_day(12).order.is_none());
        assert_eq!(by_day(20).status, DayStatus::Ordered);
        assert_eq!(by_day(15).status, DayStatus::NotOrdered);
        assert_eq!(by_day(1).status, DayStatus::NotOrdered);
    }

    #[tokio::test]
    async fn recording_a_delivery_twice_is_idempotent() {
        let pool = test_pool().await;
        let calendar = CalendarService::new(&pool);
        let customer_id = seed_customer_id(&pool).await;
        let d = date(2024, 3, 12);

        calendar.record_delivery(customer_id, d).await.unwrap();
        calendar.record_delivery(customer_id, d).await.unwrap();

        let month = calendar
            .project_month(customer_id, 2024, 3, date(2024, 3, 1))
            .await
            .unwrap();
        assert_eq!(month[11].status, DayStatus::Delivered);
    }
}
