//! Order repository.
//!
//! Orders are keyed by (customer, delivery date); the UNIQUE constraint makes
//! `upsert` a single atomic insert-or-overwrite.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use milkround_core::{CustomerId, Quantity};

use super::RepositoryError;
use crate::models::Order;

const ORDER_COLUMNS: &str = "id, customer_id, delivery_date, brand, quantity, notes";

/// Repository for date-specific orders.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an order for (customer, date), overwriting brand, quantity,
    /// and notes in place if one already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert(
        &self,
        customer_id: CustomerId,
        date: NaiveDate,
        brand: &str,
        quantity: Quantity,
        notes: &str,
    ) -> Result<Order, RepositoryError> {
        let sql = format!(
            "INSERT INTO orders (customer_id, delivery_date, brand, quantity, notes) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT (customer_id, delivery_date) DO UPDATE SET \
                 brand = excluded.brand, \
                 quantity = excluded.quantity, \
                 notes = excluded.notes \
             RETURNING {ORDER_COLUMNS}"
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(customer_id)
            .bind(date)
            .bind(brand)
            .bind(quantity)
            .bind(notes)
            .fetch_one(self.pool)
            .await?;

        Ok(order)
    }

    /// Get the order for (customer, date), if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        customer_id: CustomerId,
        date: NaiveDate,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE customer_id = ?1 AND delivery_date = ?2"
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(customer_id)
            .bind(date)
            .fetch_optional(self.pool)
            .await?;

        Ok(order)
    }

    /// Delete the order for (customer, date).
    ///
    /// Returns `true` if an order was deleted, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn delete(
        &self,
        customer_id: CustomerId,
        date: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM orders WHERE customer_id = ?1 AND delivery_date = ?2",
        )
        .bind(customer_id)
        .bind(date)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a customer's orders on or after a date, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_from(
        &self,
        customer_id: CustomerId,
        from: NaiveDate,
    ) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE customer_id = ?1 AND delivery_date >= ?2 \
             ORDER BY delivery_date ASC"
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(customer_id)
            .bind(from)
            .fetch_all(self.pool)
            .await?;

        Ok(orders)
    }

    /// List a customer's orders within an inclusive date range.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_in_range(
        &self,
        customer_id: CustomerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE customer_id = ?1 AND delivery_date BETWEEN ?2 AND ?3 \
             ORDER BY delivery_date ASC"
        );

        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(customer_id)
            .bind(start)
            .bind(end)
            .fetch_all(self.pool)
            .await?;

        Ok(orders)
    }
}
