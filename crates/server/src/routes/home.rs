//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate;

/// Display the home page with links to each role's entry points.
pub async fn home() -> impl IntoResponse {
    HomeTemplate
}
