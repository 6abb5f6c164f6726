//! Admin account repository.

use sqlx::{Row, SqlitePool};

use milkround_core::Email;

use super::{RepositoryError, map_unique};
use crate::models::Admin;

const ADMIN_COLUMNS: &str = "id, name, email, farm_name, created_at";

/// Repository for admin account operations.
pub struct AdminRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        farm_name: &str,
        password_hash: &str,
    ) -> Result<Admin, RepositoryError> {
        let sql = format!(
            "INSERT INTO admins (name, email, farm_name, password_hash) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING {ADMIN_COLUMNS}"
        );

        sqlx::query_as::<_, Admin>(&sql)
            .bind(name)
            .bind(email.as_str())
            .bind(farm_name)
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_unique(e, "email already registered"))
    }

    /// Get an admin and their password hash by email.
    ///
    /// Returns `None` if no admin exists for the email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Admin, String)>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, email, farm_name, password_hash, created_at \
             FROM admins WHERE email = ?1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let password_hash: String = row.try_get("password_hash")?;
        let admin = Admin {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            farm_name: row.try_get("farm_name")?,
            created_at: row.try_get("created_at")?,
        };

        Ok(Some((admin, password_hash)))
    }
}
