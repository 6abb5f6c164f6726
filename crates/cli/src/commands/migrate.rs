//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! milkround migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MILKROUND_DATABASE_URL` - `SQLite` connection string
//!   (default: `sqlite:milkround.db`)

use secrecy::SecretString;
use tracing::info;

use milkround_server::db;

/// Bring the database schema up to date.
///
/// The server runs the same migrations at startup; this command exists for
/// preparing a database without starting the server.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = SecretString::from(
        std::env::var("MILKROUND_DATABASE_URL").unwrap_or_else(|_| "sqlite:milkround.db".to_owned()),
    );

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
