//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::Page;
use crate::routes::catalog::ProductCard;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: Page,
    pub featured: Vec<ProductCard>,
    pub best_sellers: Vec<ProductCard>,
}

/// Home page: featured products and best sellers.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, page: Page) -> Result<HomeTemplate> {
    let api = state.api();
    let (featured, best_sellers) = tokio::try_join!(api.featured_products(), api.best_sellers())?;
    let favorites = super::favorites::load_for(&state, page.user.as_ref()).await?;

    Ok(HomeTemplate {
        featured: ProductCard::list(api, &featured, favorites.as_ref()),
        best_sellers: ProductCard::list(api, &best_sellers, favorites.as_ref()),
        page,
    })
}
