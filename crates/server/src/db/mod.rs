//! Database operations for the Milkround `SQLite` store.
//!
//! ## Tables
//!
//! - `admins` - Farm administrator accounts
//! - `milkmen` - Delivery person accounts and their codes
//! - `customers` - Customer accounts, preferences, and milkman linkage
//! - `orders` - Date-specific orders, unique per (customer, date)
//! - `deliveries` - Completion records, unique per (customer, date)
//! - tower-sessions table (created by the session store itself)
//!
//! Migrations live in `crates/server/migrations/` and are embedded into the
//! binary; they run at startup and via `milkround migrate`.

pub mod admins;
pub mod customers;
pub mod deliveries;
pub mod milkmen;
pub mod orders;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use admins::AdminRepository;
pub use customers::CustomerRepository;
pub use deliveries::DeliveryRepository;
pub use milkmen::MilkmanRepository;
pub use orders::OrderRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique phone, unknown foreign code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to `Conflict`, passing other errors
/// through as `Database`.
pub(crate) fn map_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(e)
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Creates the database file if missing and enforces foreign keys, so the
/// customer-to-milkman linkage cannot reference an unknown code.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// In-memory pool with the schema applied, for unit tests.
///
/// Capped at one connection: each `SQLite` in-memory connection is its own
/// database.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("parse in-memory options")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect in-memory database");

    MIGRATOR.run(&pool).await.expect("run migrations");
    pool
}
