//! `/categories` endpoints.

use std::sync::Arc;

use bloomway_core::CategoryId;
use bloomway_core::models::{Category, CategoryInput};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, CacheKey, Resource, segment};

impl ApiClient {
    /// `GET /categories`
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        self.cached(CacheKey::Categories, async {
            self.send_json::<Vec<Category>>(self.request(Method::GET, "categories", None)?)
                .await
        })
        .await
    }

    /// `GET /categories/{id}`
    #[instrument(skip(self))]
    pub async fn category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let path = format!("categories/{}", segment(id.as_str()));
        self.send_json(self.request(Method::GET, &path, None)?)
            .await
    }

    /// `POST /categories`
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        token: &str,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let result = self
            .send_json(self.request(Method::POST, "categories", Some(token))?.json(input))
            .await;
        self.invalidate(Resource::Categories).await;
        result
    }

    /// `PUT /categories/{id}`
    #[instrument(skip(self, token, input))]
    pub async fn update_category(
        &self,
        token: &str,
        id: &CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let path = format!("categories/{}", segment(id.as_str()));
        let result = self
            .send_json(self.request(Method::PUT, &path, Some(token))?.json(input))
            .await;
        self.invalidate(Resource::Categories).await;
        result
    }

    /// `DELETE /categories/{id}`
    #[instrument(skip(self, token))]
    pub async fn delete_category(&self, token: &str, id: &CategoryId) -> Result<(), ApiError> {
        let path = format!("categories/{}", segment(id.as_str()));
        let result = self
            .send_empty(self.request(Method::DELETE, &path, Some(token))?)
            .await;
        self.invalidate(Resource::Categories).await;
        result
    }
}
