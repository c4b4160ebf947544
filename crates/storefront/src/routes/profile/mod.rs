//! Profile area: account overview plus store and product management for staff.

pub mod products;
pub mod stores;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    routing::{get, post},
};
use tracing::instrument;

use crate::filters;
use crate::middleware::{Page, RequireAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Create the profile routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/stores", get(stores::index).post(stores::create))
        .route("/stores/new", get(stores::new))
        .route("/stores/{id}", post(stores::update))
        .route("/stores/{id}/edit", get(stores::edit))
        .route("/stores/{id}/delete", post(stores::delete))
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new))
        .route("/products/{id}", post(products::update))
        .route("/products/{id}/edit", get(products::edit))
        .route("/products/{id}/delete", post(products::delete))
}

#[derive(Template, WebTemplate)]
#[template(path = "profile/index.html")]
pub struct ProfileTemplate {
    pub page: Page,
    pub user: CurrentUser,
}

/// Account overview with links to the areas the role unlocks.
#[instrument(skip_all)]
pub async fn index(RequireAuth(user): RequireAuth, page: Page) -> ProfileTemplate {
    ProfileTemplate { page, user }
}
