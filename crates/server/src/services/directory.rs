//! Milkman directory service.
//!
//! Code generation, roster lookups, customer reassignment, and the per-date
//! delivery manifest.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use thiserror::Error;

use milkround_core::{CustomerId, MilkmanCode};

use crate::db::{CustomerRepository, MilkmanRepository, RepositoryError};
use crate::models::{Customer, EffectiveOrder};
use crate::services::orders::{OrderError, OrderService};

/// Errors that can occur in directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The given milkman code does not exist.
    #[error("unknown milkman code")]
    UnknownMilkmanCode,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl DirectoryError {
    /// Short code for user-recoverable failures, used in form redirects.
    #[must_use]
    pub const fn user_code(&self) -> Option<&'static str> {
        match self {
            Self::UnknownMilkmanCode => Some("unknown_code"),
            Self::Repository(_) => None,
        }
    }
}

/// One customer's line on a milkman's delivery manifest.
#[derive(Debug, Clone)]
pub struct ManifestLine {
    pub customer: Customer,
    pub effective: EffectiveOrder,
}

/// Milkman directory service.
pub struct DirectoryService<'a> {
    pool: &'a SqlitePool,
    milkmen: MilkmanRepository<'a>,
    customers: CustomerRepository<'a>,
}

impl<'a> DirectoryService<'a> {
    /// Create a new directory service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            milkmen: MilkmanRepository::new(pool),
            customers: CustomerRepository::new(pool),
        }
    }

    /// Draw 6-digit codes until one is free.
    ///
    /// The codespace is large relative to the number of milkmen, so this
    /// terminates quickly; the UNIQUE constraint on `milkmen.code` backstops
    /// a concurrent draw of the same code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the existence check fails.
    pub async fn generate_code(&self) -> Result<MilkmanCode, RepositoryError> {
        loop {
            let code = {
                let mut rng = rand::rng();
                MilkmanCode::random(&mut rng)
            };

            if !self.milkmen.code_exists(&code).await? {
                return Ok(code);
            }
        }
    }

    /// Move a customer to the milkman identified by `new_code`.
    ///
    /// The linkage is one column on the customer row, so the handoff from
    /// the old milkman to the new one is a single statement: the customer
    /// can never end up unlinked or linked to both.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMilkmanCode` if the code is malformed or unregistered.
    pub async fn reassign_customer(
        &self,
        customer_id: CustomerId,
        new_code: &str,
    ) -> Result<(), DirectoryError> {
        let code =
            MilkmanCode::parse(new_code).map_err(|_| DirectoryError::UnknownMilkmanCode)?;

        if self.milkmen.get_by_code(&code).await?.is_none() {
            return Err(DirectoryError::UnknownMilkmanCode);
        }

        self.customers
            .update_milkman_code(customer_id, &code)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => DirectoryError::UnknownMilkmanCode,
                other => DirectoryError::Repository(other),
            })?;

        Ok(())
    }

    /// The customers linked to a milkman code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn roster(&self, code: &MilkmanCode) -> Result<Vec<Customer>, RepositoryError> {
        self.customers.list_by_milkman_code(code).await
    }

    /// The delivery manifest for a milkman and date: every linked customer
    /// with their effective order (explicit order or default preference).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` wrapped errors if lookups fail.
    pub async fn manifest(
        &self,
        code: &MilkmanCode,
        date: NaiveDate,
    ) -> Result<Vec<ManifestLine>, DirectoryError> {
        let orders = OrderService::new(self.pool);
        let roster = self.roster(code).await?;

        let mut lines = Vec::with_capacity(roster.len());
        for customer in roster {
            let effective = orders
                .resolve_effective_order(&customer, date)
                .await
                .map_err(|e| match e {
                    OrderError::Repository(repo) => DirectoryError::Repository(repo),
                    // resolve_effective_order only fails on repository errors
                    other => DirectoryError::Repository(RepositoryError::DataCorruption(
                        other.to_string(),
                    )),
                })?;
            lines.push(ManifestLine {
                customer,
                effective,
            });
        }

        Ok(lines)
    }
}
