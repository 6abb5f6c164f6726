//! Delivery-completion repository.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use milkround_core::CustomerId;

use super::RepositoryError;

/// Repository for delivery-completion records.
pub struct DeliveryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DeliveryRepository<'a> {
    /// Create a new delivery repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a completed delivery for (customer, date).
    ///
    /// Idempotent: recording the same delivery twice keeps the first
    /// timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn record(
        &self,
        customer_id: CustomerId,
        date: NaiveDate,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO deliveries (customer_id, delivery_date) VALUES (?1, ?2) \
             ON CONFLICT (customer_id, delivery_date) DO NOTHING",
        )
        .bind(customer_id)
        .bind(date)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Dates within an inclusive range that have a delivery record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn dates_in_range(
        &self,
        customer_id: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, RepositoryError> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT delivery_date FROM deliveries \
             WHERE customer_id = ?1 AND delivery_date BETWEEN ?2 AND ?3 \
             ORDER BY delivery_date ASC",
        )
        .bind(customer_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        Ok(dates)
    }
}
