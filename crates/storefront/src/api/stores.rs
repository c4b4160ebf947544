//! `/stores` endpoints.

use std::sync::Arc;

use bloomway_core::StoreId;
use bloomway_core::models::{Store, StoreInput};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, CacheKey, Resource, segment};

impl ApiClient {
    /// `GET /stores`
    #[instrument(skip(self))]
    pub async fn stores(&self) -> Result<Arc<Vec<Store>>, ApiError> {
        self.cached(CacheKey::Stores, async {
            self.send_json::<Vec<Store>>(self.request(Method::GET, "stores", None)?)
                .await
        })
        .await
    }

    /// `GET /stores/{id}`
    #[instrument(skip(self))]
    pub async fn store(&self, id: &StoreId) -> Result<Arc<Store>, ApiError> {
        self.cached(CacheKey::Store(id.clone()), async {
            let path = format!("stores/{}", segment(id.as_str()));
            self.send_json::<Store>(self.request(Method::GET, &path, None)?)
                .await
        })
        .await
    }

    /// `GET /stores/my`: stores owned by the token's user. Never cached.
    #[instrument(skip_all)]
    pub async fn my_stores(&self, token: &str) -> Result<Vec<Store>, ApiError> {
        self.send_json(self.request(Method::GET, "stores/my", Some(token))?)
            .await
    }

    /// `POST /stores`
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_store(&self, token: &str, input: &StoreInput) -> Result<Store, ApiError> {
        let result = self
            .send_json(self.request(Method::POST, "stores", Some(token))?.json(input))
            .await;
        self.invalidate(Resource::Stores).await;
        result
    }

    /// `PUT /stores/{id}`
    #[instrument(skip(self, token, input))]
    pub async fn update_store(
        &self,
        token: &str,
        id: &StoreId,
        input: &StoreInput,
    ) -> Result<Store, ApiError> {
        let path = format!("stores/{}", segment(id.as_str()));
        let result = self
            .send_json(self.request(Method::PUT, &path, Some(token))?.json(input))
            .await;
        self.invalidate(Resource::Stores).await;
        result
    }

    /// `DELETE /stores/{id}`
    #[instrument(skip(self, token))]
    pub async fn delete_store(&self, token: &str, id: &StoreId) -> Result<(), ApiError> {
        let path = format!("stores/{}", segment(id.as_str()));
        let result = self
            .send_empty(self.request(Method::DELETE, &path, Some(token))?)
            .await;
        self.invalidate(Resource::Stores).await;
        result
    }
}
