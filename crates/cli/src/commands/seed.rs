//! Seed the database with demo data.
//!
//! Creates one admin, one milkman, and one customer linked to them, with a
//! default preference and an order for tomorrow. Useful for trying the app
//! locally without clicking through three registration forms.

use chrono::{Days, Local};
use secrecy::SecretString;
use tracing::info;

use milkround_server::db;
use milkround_server::services::{AuthService, OrderService};

const DEMO_PASSWORD: &str = "demo-password";

/// Seed demo accounts and an order.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the accounts already
/// exist.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = SecretString::from(
        std::env::var("MILKROUND_DATABASE_URL").unwrap_or_else(|_| "sqlite:milkround.db".to_owned()),
    );

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;
    db::MIGRATOR.run(&pool).await?;

    let auth = AuthService::new(&pool);

    let admin = auth
        .register_admin("Demo Admin", "admin@example.com", "Demo Farm", DEMO_PASSWORD)
        .await?;
    info!(email = %admin.email, "Created admin");

    let milkman = auth
        .register_milkman("Demo Milkman", "9876543210", DEMO_PASSWORD)
        .await?;
    info!(code = %milkman.code, "Created milkman");

    let customer = auth
        .register_customer(
            "Demo Customer",
            "9123456780",
            "12 Dairy Lane",
            milkman.code.as_str(),
            DEMO_PASSWORD,
        )
        .await?;
    info!(name = %customer.name, "Created customer");

    let orders = OrderService::new(&pool);
    orders
        .set_default_preference(customer.id, "Regular", "1")
        .await?;

    let tomorrow = Local::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .ok_or("date overflow")?;
    orders
        .upsert_order(customer.id, tomorrow, "Premium", "2", "demo order")
        .await?;
    info!(%tomorrow, "Created order");

    info!("Seed complete! All demo accounts use password '{DEMO_PASSWORD}'");
    Ok(())
}
