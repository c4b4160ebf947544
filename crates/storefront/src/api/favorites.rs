//! `/favorites` endpoints. Favorites belong to the signed-in user and are
//! never cached.

use bloomway_core::ProductId;
use bloomway_core::cart::Favorites;
use bloomway_core::models::Product;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{ApiClient, ApiError, segment};

/// Favorites come back either as products or as favorite records with the
/// product embedded.
#[derive(Deserialize)]
#[serde(untagged)]
enum FavoriteEntry {
    Record { product: Product },
    Product(Product),
}

impl ApiClient {
    /// `GET /favorites`
    #[instrument(skip_all)]
    pub async fn favorites(&self, token: &str) -> Result<Favorites, ApiError> {
        let entries: Vec<FavoriteEntry> = self
            .send_json(self.request(Method::GET, "favorites", Some(token))?)
            .await?;
        Ok(Favorites::new(
            entries
                .into_iter()
                .map(|entry| match entry {
                    FavoriteEntry::Record { product } | FavoriteEntry::Product(product) => product,
                })
                .collect(),
        ))
    }

    /// `POST /favorites`
    #[instrument(skip(self, token))]
    pub async fn add_favorite(&self, token: &str, product: &ProductId) -> Result<(), ApiError> {
        let body = json!({ "productId": product.as_str() });
        self.send_empty(self.request(Method::POST, "favorites", Some(token))?.json(&body))
            .await
    }

    /// `DELETE /favorites/{productId}`
    #[instrument(skip(self, token))]
    pub async fn remove_favorite(&self, token: &str, product: &ProductId) -> Result<(), ApiError> {
        let path = format!("favorites/{}", segment(product.as_str()));
        self.send_empty(self.request(Method::DELETE, &path, Some(token))?)
            .await
    }

    /// `DELETE /favorites`
    #[instrument(skip_all)]
    pub async fn clear_favorites(&self, token: &str) -> Result<(), ApiError> {
        self.send_empty(self.request(Method::DELETE, "favorites", Some(token))?)
            .await
    }
}
