//! Customer account repository.

use sqlx::{Row, SqlitePool};

use milkround_core::{CustomerId, MilkmanCode, Phone, Quantity};

use super::{RepositoryError, map_unique};
use crate::models::Customer;

const CUSTOMER_COLUMNS: &str =
    "id, name, phone, address, milkman_code, default_brand, default_quantity, created_at";

/// Repository for customer account operations.
pub struct CustomerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new customer account linked to a milkman code.
    ///
    /// The foreign key on `milkman_code` backstops code validation done by
    /// the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone already exists or
    /// the code does not. Returns `RepositoryError::Database` otherwise.
    pub async fn create(
        &self,
        name: &str,
        phone: &Phone,
        address: &str,
        milkman_code: &MilkmanCode,
        password_hash: &str,
    ) -> Result<Customer, RepositoryError> {
        let sql = format!(
            "INSERT INTO customers (name, phone, address, milkman_code, password_hash) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING {CUSTOMER_COLUMNS}"
        );

        sqlx::query_as::<_, Customer>(&sql)
            .bind(name)
            .bind(phone.as_str())
            .bind(address)
            .bind(milkman_code.as_str())
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict("unknown milkman code".to_owned());
                }
                map_unique(e, "phone already registered")
            })
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");

        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(customer)
    }

    /// List all customers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id DESC");

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(customers)
    }

    /// List the customers linked to a milkman code, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_milkman_code(
        &self,
        code: &MilkmanCode,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE milkman_code = ?1 ORDER BY id ASC"
        );

        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(code.as_str())
            .fetch_all(self.pool)
            .await?;

        Ok(customers)
    }

    /// Move a customer to a different milkman.
    ///
    /// A single-row update: the customer leaves the old milkman and joins
    /// the new one in one statement, so no fault can leave them unlinked or
    /// double-linked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Conflict` if the code does not exist.
    pub async fn update_milkman_code(
        &self,
        id: CustomerId,
        code: &MilkmanCode,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE customers SET milkman_code = ?1 WHERE id = ?2")
            .bind(code.as_str())
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict("unknown milkman code".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Overwrite a customer's default brand/quantity preference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    pub async fn set_default_preference(
        &self,
        id: CustomerId,
        brand: &str,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE customers SET default_brand = ?1, default_quantity = ?2 WHERE id = ?3",
        )
        .bind(brand)
        .bind(quantity)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Get a customer and their password hash by phone.
    ///
    /// Returns `None` if no customer exists for the phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        phone: &Phone,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS}, password_hash FROM customers WHERE phone = ?1"
        );

        let row = sqlx::query(&sql)
            .bind(phone.as_str())
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let password_hash: String = row.try_get("password_hash")?;
        let customer = Customer {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            milkman_code: row.try_get("milkman_code")?,
            default_brand: row.try_get("default_brand")?,
            default_quantity: row.try_get("default_quantity")?,
            created_at: row.try_get("created_at")?,
        };

        Ok(Some((customer, password_hash)))
    }
}
