//! Favorites route handlers. Favorites live in the API, per signed-in user.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Response,
};
use bloomway_core::ProductId;
use bloomway_core::cart::Favorites;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{Page, RequireAuth, session::referer_path};
use crate::models::{CurrentUser, Flash};
use crate::routes::catalog::ProductCard;
use crate::routes::{labels, recover, redirect_with};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "favorites.html")]
pub struct FavoritesTemplate {
    pub page: Page,
    pub products: Vec<ProductCard>,
    pub total: String,
}

/// The signed-in visitor's favorites, for marking product cards.
///
/// Signed-out visitors have none. Failures other than an expired token only
/// hide the markers.
pub(crate) async fn load_for(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> std::result::Result<Option<Favorites>, AppError> {
    let Some(user) = user else {
        return Ok(None);
    };
    match state.api().favorites(user.token()).await {
        Ok(favorites) => Ok(Some(favorites)),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Could not load favorites");
            Ok(None)
        }
    }
}

/// Favorites page.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    page: Page,
) -> Result<FavoritesTemplate> {
    let favorites = state.api().favorites(user.token()).await?;
    Ok(FavoritesTemplate {
        products: ProductCard::list(state.api(), favorites.products(), Some(&favorites)),
        total: favorites.total().display(),
        page,
    })
}

/// Add the product to favorites, or remove it when already there.
#[instrument(skip(state, session, headers, user))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let back = referer_path(&headers).unwrap_or_else(|| "/favorites".to_string());
    let product = ProductId::new(id);
    let api = state.api();

    let result = match api.favorites(user.token()).await {
        Ok(current) if current.contains(&product) => {
            api.remove_favorite(user.token(), &product).await
        }
        Ok(_) => api.add_favorite(user.token(), &product).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            add_breadcrumb("favorites", "Toggled favorite", Some(&[("product_id", product.as_str())]));
            Ok(redirect_with(&session, Flash::success(labels.favorites_updated), &back).await)
        }
        Err(e) => recover(&session, labels, e, &back).await,
    }
}

/// Remove every favorite.
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    match state.api().clear_favorites(user.token()).await {
        Ok(()) => Ok(redirect_with(&session, Flash::success(labels.favorites_updated), "/favorites").await),
        Err(e) => recover(&session, labels, e, "/favorites").await,
    }
}
