//! Milkman account repository.

use sqlx::{Row, SqlitePool};

use milkround_core::{MilkmanCode, MilkmanId, Phone};

use super::{RepositoryError, map_unique};
use crate::models::Milkman;

const MILKMAN_COLUMNS: &str = "id, name, phone, code, created_at";

/// Repository for milkman account operations.
pub struct MilkmanRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MilkmanRepository<'a> {
    /// Create a new milkman repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new milkman account with an already-generated code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone or code already
    /// exists. Returns `RepositoryError::Database` for other errors.
    pub async fn create(
        &self,
        name: &str,
        phone: &Phone,
        code: &MilkmanCode,
        password_hash: &str,
    ) -> Result<Milkman, RepositoryError> {
        let sql = format!(
            "INSERT INTO milkmen (name, phone, code, password_hash) \
             VALUES (?1, ?2, ?3, ?4) \
             RETURNING {MILKMAN_COLUMNS}"
        );

        sqlx::query_as::<_, Milkman>(&sql)
            .bind(name)
            .bind(phone.as_str())
            .bind(code.as_str())
            .bind(password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_unique(e, "phone already registered"))
    }

    /// Whether a code is already taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn code_exists(&self, code: &MilkmanCode) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 FROM milkmen WHERE code = ?1")
            .bind(code.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.is_some())
    }

    /// Get a milkman by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: MilkmanId) -> Result<Option<Milkman>, RepositoryError> {
        let sql = format!("SELECT {MILKMAN_COLUMNS} FROM milkmen WHERE id = ?1");

        let milkman = sqlx::query_as::<_, Milkman>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(milkman)
    }

    /// Get a milkman by code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(
        &self,
        code: &MilkmanCode,
    ) -> Result<Option<Milkman>, RepositoryError> {
        let sql = format!("SELECT {MILKMAN_COLUMNS} FROM milkmen WHERE code = ?1");

        let milkman = sqlx::query_as::<_, Milkman>(&sql)
            .bind(code.as_str())
            .fetch_optional(self.pool)
            .await?;

        Ok(milkman)
    }

    /// List all milkmen, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Milkman>, RepositoryError> {
        let sql = format!("SELECT {MILKMAN_COLUMNS} FROM milkmen ORDER BY id DESC");

        let milkmen = sqlx::query_as::<_, Milkman>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(milkmen)
    }

    /// Get a milkman and their password hash by phone.
    ///
    /// Returns `None` if no milkman exists for the phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        phone: &Phone,
    ) -> Result<Option<(Milkman, String)>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, phone, code, password_hash, created_at \
             FROM milkmen WHERE phone = ?1",
        )
        .bind(phone.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let password_hash: String = row.try_get("password_hash")?;
        let milkman = Milkman {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            code: row.try_get("code")?,
            created_at: row.try_get("created_at")?,
        };

        Ok(Some((milkman, password_hash)))
    }
}
