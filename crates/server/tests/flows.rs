//! End-to-end flow tests driving the server over HTTP.
//!
//! Each test spawns the app on an ephemeral port with its own in-memory
//! database and talks to it with a cookie-holding reqwest client, the same
//! way a browser would.

use std::str::FromStr;

use chrono::{Days, Local};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use milkround_server::config::Config;
use milkround_server::db::MIGRATOR;
use milkround_server::state::AppState;

struct TestApp {
    base_url: String,
    pool: SqlitePool,
}

/// Spawn the full application on an ephemeral port.
///
/// The pool is capped at one connection: each `SQLite` in-memory connection
/// is its own database.
async fn spawn_app() -> TestApp {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("parse in-memory options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect in-memory database");
    MIGRATOR.run(&pool).await.expect("run migrations");

    let state = AppState::new(Config::for_tests(), pool.clone());
    let router = milkround_server::app(state).await.expect("build app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    TestApp {
        base_url: format!("http://{addr}"),
        pool,
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("build client")
}

fn days_ahead(n: u64) -> String {
    (Local::now().date_naive() + Days::new(n)).to_string()
}

/// Register a milkman over HTTP and return their linking code from the
/// database.
async fn register_milkman(app: &TestApp, phone: &str) -> String {
    let resp = client()
        .post(format!("{}/milkman/register", app.base_url))
        .form(&[("name", "Ram"), ("phone", phone), ("password", "round-one-8")])
        .send()
        .await
        .expect("register milkman");
    assert!(resp.status().is_success());

    sqlx::query_scalar::<_, String>("SELECT code FROM milkmen WHERE phone = ?")
        .bind(phone)
        .fetch_one(&app.pool)
        .await
        .expect("read milkman code")
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = spawn_app().await;
    let http = client();

    let resp = http
        .get(format!("{}/health", app.base_url))
        .send()
        .await
        .expect("health");
    assert!(resp.status().is_success());

    let resp = http
        .get(format!("{}/health/ready", app.base_url))
        .send()
        .await
        .expect("ready");
    assert!(resp.status().is_success());
}

#[tokio::test]
async fn customer_can_register_order_and_cancel() {
    let app = spawn_app().await;
    let code = register_milkman(&app, "9876543210").await;

    let http = client();

    // Register and land on the dashboard, logged in.
    let resp = http
        .post(format!("{}/customer/register", app.base_url))
        .form(&[
            ("name", "Sita"),
            ("phone", "9123456780"),
            ("address", "12 Dairy Lane"),
            ("milkman_code", code.as_str()),
            ("password", "round-one-8"),
        ])
        .send()
        .await
        .expect("register customer");
    assert!(resp.url().path().ends_with("/customer"), "{}", resp.url());

    // Set the everyday default.
    let resp = http
        .post(format!("{}/customer/preferences", app.base_url))
        .form(&[("brand", "Regular"), ("quantity", "1")])
        .send()
        .await
        .expect("set preferences");
    assert!(resp.status().is_success());
    assert!(!resp.url().as_str().contains("error="), "{}", resp.url());

    // Order something different for the day after tomorrow.
    let date = days_ahead(2);
    let resp = http
        .post(format!("{}/customer/orders", app.base_url))
        .form(&[
            ("date", date.as_str()),
            ("brand", "Premium"),
            ("quantity", "2"),
            ("notes", "leave at gate"),
        ])
        .send()
        .await
        .expect("place order");
    assert!(!resp.url().as_str().contains("error="), "{}", resp.url());

    let body = resp.text().await.expect("orders page body");
    assert!(body.contains("Premium"), "order missing from orders page");

    // The calendar for the order's month shows it as upcoming.
    let order_day = Local::now().date_naive() + Days::new(2);
    let resp = http
        .get(format!(
            "{}/customer/calendar?year={}&month={}",
            app.base_url,
            order_day.format("%Y"),
            order_day.format("%m"),
        ))
        .send()
        .await
        .expect("calendar");
    let body = resp.text().await.expect("calendar body");
    assert!(body.contains("day-ordered"), "calendar missing the order");

    // Cancel it again.
    let resp = http
        .post(format!("{}/customer/orders/cancel", app.base_url))
        .form(&[("date", date.as_str())])
        .send()
        .await
        .expect("cancel order");
    assert!(!resp.url().as_str().contains("error="), "{}", resp.url());

    let body = resp.text().await.expect("orders page after cancel");
    assert!(!body.contains("Premium"), "cancelled order still listed");
}

#[tokio::test]
async fn cancelling_todays_order_hits_the_cutoff() {
    let app = spawn_app().await;
    let code = register_milkman(&app, "9876543211").await;

    let http = client();
    http.post(format!("{}/customer/register", app.base_url))
        .form(&[
            ("name", "Sita"),
            ("phone", "9123456781"),
            ("address", "12 Dairy Lane"),
            ("milkman_code", code.as_str()),
            ("password", "round-one-8"),
        ])
        .send()
        .await
        .expect("register customer");

    // Ordering for today is allowed.
    let today = days_ahead(0);
    let resp = http
        .post(format!("{}/customer/orders", app.base_url))
        .form(&[
            ("date", today.as_str()),
            ("brand", "Premium"),
            ("quantity", "2"),
        ])
        .send()
        .await
        .expect("place order for today");
    assert!(!resp.url().as_str().contains("error="), "{}", resp.url());

    // Cancelling it is not.
    let resp = http
        .post(format!("{}/customer/orders/cancel", app.base_url))
        .form(&[("date", today.as_str())])
        .send()
        .await
        .expect("cancel today");
    assert!(
        resp.url().as_str().contains("error=cutoff"),
        "{}",
        resp.url()
    );
}

#[tokio::test]
async fn duplicate_phone_is_rejected_on_register() {
    let app = spawn_app().await;
    let code = register_milkman(&app, "9876543212").await;

    let form = [
        ("name", "Sita"),
        ("phone", "9123456782"),
        ("address", "12 Dairy Lane"),
        ("milkman_code", code.as_str()),
        ("password", "round-one-8"),
    ];

    let http = client();
    http.post(format!("{}/customer/register", app.base_url))
        .form(&form)
        .send()
        .await
        .expect("first registration");

    let resp = client()
        .post(format!("{}/customer/register", app.base_url))
        .form(&form)
        .send()
        .await
        .expect("second registration");
    assert!(
        resp.url().as_str().contains("error=duplicate"),
        "{}",
        resp.url()
    );
}

#[tokio::test]
async fn wrong_password_fails_generically() {
    let app = spawn_app().await;
    register_milkman(&app, "9876543213").await;

    let resp = client()
        .post(format!("{}/milkman/login", app.base_url))
        .form(&[("phone", "9876543213"), ("password", "wrong-password")])
        .send()
        .await
        .expect("login attempt");
    assert!(
        resp.url().as_str().contains("error=credentials"),
        "{}",
        resp.url()
    );

    // An unregistered phone produces the same code.
    let resp = client()
        .post(format!("{}/milkman/login", app.base_url))
        .form(&[("phone", "9000000000"), ("password", "wrong-password")])
        .send()
        .await
        .expect("login attempt for unknown phone");
    assert!(
        resp.url().as_str().contains("error=credentials"),
        "{}",
        resp.url()
    );
}

#[tokio::test]
async fn dashboards_require_login() {
    let app = spawn_app().await;
    let http = client();

    for (page, login) in [
        ("/customer", "/customer/login"),
        ("/milkman", "/milkman/login"),
        ("/admin", "/admin/login"),
    ] {
        let resp = http
            .get(format!("{}{page}", app.base_url))
            .send()
            .await
            .expect("dashboard request");
        assert_eq!(resp.url().path(), login, "{page}");
    }
}

#[tokio::test]
async fn malformed_order_date_redirects_with_an_error() {
    let app = spawn_app().await;
    let code = register_milkman(&app, "9876543215").await;

    let http = client();
    http.post(format!("{}/customer/register", app.base_url))
        .form(&[
            ("name", "Sita"),
            ("phone", "9123456785"),
            ("address", "12 Dairy Lane"),
            ("milkman_code", code.as_str()),
            ("password", "round-one-8"),
        ])
        .send()
        .await
        .expect("register customer");

    let resp = http
        .post(format!("{}/customer/orders", app.base_url))
        .form(&[
            ("date", "not-a-date"),
            ("brand", "Premium"),
            ("quantity", "2"),
        ])
        .send()
        .await
        .expect("place order with bad date");
    assert!(resp.status().is_success());
    assert!(resp.url().as_str().contains("error=date"), "{}", resp.url());

    let resp = http
        .post(format!("{}/customer/orders/cancel", app.base_url))
        .form(&[("date", "2024-13-45")])
        .send()
        .await
        .expect("cancel with bad date");
    assert!(resp.status().is_success());
    assert!(resp.url().as_str().contains("error=date"), "{}", resp.url());
}

#[tokio::test]
async fn milkman_can_only_record_deliveries_for_own_round() {
    let app = spawn_app().await;
    let code_a = register_milkman(&app, "9876543216").await;
    register_milkman(&app, "9876543217").await;

    // Customer linked to milkman A.
    client()
        .post(format!("{}/customer/register", app.base_url))
        .form(&[
            ("name", "Sita"),
            ("phone", "9123456786"),
            ("address", "12 Dairy Lane"),
            ("milkman_code", code_a.as_str()),
            ("password", "round-one-8"),
        ])
        .send()
        .await
        .expect("register customer");
    let customer_id = sqlx::query_scalar::<_, i64>("SELECT id FROM customers WHERE phone = ?")
        .bind("9123456786")
        .fetch_one(&app.pool)
        .await
        .expect("read customer id");

    let tomorrow = days_ahead(1);
    let delivery_form = [
        ("customer_id", customer_id.to_string()),
        ("date", tomorrow.clone()),
    ];

    // Milkman B cannot mark the delivery.
    let other = client();
    other
        .post(format!("{}/milkman/login", app.base_url))
        .form(&[("phone", "9876543217"), ("password", "round-one-8")])
        .send()
        .await
        .expect("milkman B login");
    let resp = other
        .post(format!("{}/milkman/deliveries", app.base_url))
        .form(&delivery_form)
        .send()
        .await
        .expect("record delivery as milkman B");
    assert!(
        resp.url().as_str().contains("error=roster"),
        "{}",
        resp.url()
    );

    // A forged id that matches nobody is rejected the same way.
    let resp = other
        .post(format!("{}/milkman/deliveries", app.base_url))
        .form(&[
            ("customer_id", "9999".to_string()),
            ("date", tomorrow.clone()),
        ])
        .send()
        .await
        .expect("record delivery for unknown customer");
    assert!(
        resp.url().as_str().contains("error=roster"),
        "{}",
        resp.url()
    );

    let recorded = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deliveries")
        .fetch_one(&app.pool)
        .await
        .expect("count deliveries");
    assert_eq!(recorded, 0, "foreign delivery was recorded");

    // Milkman A can.
    let own = client();
    own.post(format!("{}/milkman/login", app.base_url))
        .form(&[("phone", "9876543216"), ("password", "round-one-8")])
        .send()
        .await
        .expect("milkman A login");
    let resp = own
        .post(format!("{}/milkman/deliveries", app.base_url))
        .form(&delivery_form)
        .send()
        .await
        .expect("record delivery as milkman A");
    assert!(!resp.url().as_str().contains("error="), "{}", resp.url());

    let recorded = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM deliveries")
        .fetch_one(&app.pool)
        .await
        .expect("count deliveries");
    assert_eq!(recorded, 1);
}

#[tokio::test]
async fn admin_dashboard_shows_roster_sizes() {
    let app = spawn_app().await;
    let code = register_milkman(&app, "9876543218").await;

    for phone in ["9123456787", "9123456788"] {
        client()
            .post(format!("{}/customer/register", app.base_url))
            .form(&[
                ("name", "Sita"),
                ("phone", phone),
                ("address", "12 Dairy Lane"),
                ("milkman_code", code.as_str()),
                ("password", "round-one-8"),
            ])
            .send()
            .await
            .expect("register customer");
    }

    // Registering as admin lands on the dashboard, logged in.
    let resp = client()
        .post(format!("{}/admin/register", app.base_url))
        .form(&[
            ("name", "Asha"),
            ("email", "asha@example.com"),
            ("farm_name", "Hillside Dairy"),
            ("password", "round-one-8"),
        ])
        .send()
        .await
        .expect("register admin");
    assert!(resp.url().path().ends_with("/admin"), "{}", resp.url());

    let body = resp.text().await.expect("admin dashboard body");
    assert!(body.contains("2 on round"), "roster size missing:\n{body}");
}

#[tokio::test]
async fn milkman_manifest_shows_defaults_and_orders() {
    let app = spawn_app().await;
    let code = register_milkman(&app, "9876543214").await;

    // Customer with a default of Regular/1 and an explicit order for
    // tomorrow, which is the manifest date.
    let customer = client();
    customer
        .post(format!("{}/customer/register", app.base_url))
        .form(&[
            ("name", "Sita"),
            ("phone", "9123456784"),
            ("address", "12 Dairy Lane"),
            ("milkman_code", code.as_str()),
            ("password", "round-one-8"),
        ])
        .send()
        .await
        .expect("register customer");

    let tomorrow = days_ahead(1);
    customer
        .post(format!("{}/customer/orders", app.base_url))
        .form(&[
            ("date", tomorrow.as_str()),
            ("brand", "Premium"),
            ("quantity", "2"),
            ("notes", "gate code 4"),
        ])
        .send()
        .await
        .expect("place order");

    // The milkman registered through `register_milkman` used a throwaway
    // client, so log in again.
    let milkman = client();
    let resp = milkman
        .post(format!("{}/milkman/login", app.base_url))
        .form(&[("phone", "9876543214"), ("password", "round-one-8")])
        .send()
        .await
        .expect("milkman login");
    assert!(resp.url().path().ends_with("/milkman"), "{}", resp.url());

    let body = resp.text().await.expect("dashboard body");
    assert!(body.contains(&code), "dashboard missing linking code");
    assert!(body.contains("Sita"), "roster missing customer");
    assert!(body.contains("Premium"), "manifest missing explicit order");
    assert!(body.contains("gate code 4"), "manifest missing notes");
}
