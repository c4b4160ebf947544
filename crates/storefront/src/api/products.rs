//! `/products` endpoints.

use std::sync::Arc;

use bloomway_core::models::{Product, ProductInput};
use bloomway_core::{ProductId, StoreId};
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, CacheKey, Resource, Upload, segment};

impl ApiClient {
    /// `GET /products`
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached(CacheKey::Products, async {
            self.send_json::<Vec<Product>>(self.request(Method::GET, "products", None)?)
                .await
        })
        .await
    }

    /// `GET /products/featured`
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached(CacheKey::Featured, async {
            self.send_json::<Vec<Product>>(self.request(Method::GET, "products/featured", None)?)
                .await
        })
        .await
    }

    /// `GET /products/bestsellers`
    #[instrument(skip(self))]
    pub async fn best_sellers(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached(CacheKey::BestSellers, async {
            self.send_json::<Vec<Product>>(self.request(Method::GET, "products/bestsellers", None)?)
                .await
        })
        .await
    }

    /// `GET /products/{id}`
    #[instrument(skip(self))]
    pub async fn product(&self, id: &ProductId) -> Result<Arc<Product>, ApiError> {
        self.cached(CacheKey::Product(id.clone()), async {
            let path = format!("products/{}", segment(id.as_str()));
            self.send_json::<Product>(self.request(Method::GET, &path, None)?)
                .await
        })
        .await
    }

    /// `GET /products/store/{storeId}`
    #[instrument(skip(self))]
    pub async fn store_products(&self, store: &StoreId) -> Result<Arc<Vec<Product>>, ApiError> {
        self.cached(CacheKey::StoreProducts(store.clone()), async {
            let path = format!("products/store/{}", segment(store.as_str()));
            self.send_json::<Vec<Product>>(self.request(Method::GET, &path, None)?)
                .await
        })
        .await
    }

    /// `POST /products`
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_product(&self, token: &str, input: &ProductInput) -> Result<Product, ApiError> {
        let result = self
            .send_json(self.request(Method::POST, "products", Some(token))?.json(input))
            .await;
        self.invalidate(Resource::Products).await;
        result
    }

    /// `PUT /products/{id}`
    #[instrument(skip(self, token, input))]
    pub async fn update_product(
        &self,
        token: &str,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let path = format!("products/{}", segment(id.as_str()));
        let result = self
            .send_json(self.request(Method::PUT, &path, Some(token))?.json(input))
            .await;
        self.invalidate(Resource::Products).await;
        result
    }

    /// `DELETE /products/{id}`
    #[instrument(skip(self, token))]
    pub async fn delete_product(&self, token: &str, id: &ProductId) -> Result<(), ApiError> {
        let path = format!("products/{}", segment(id.as_str()));
        let result = self
            .send_empty(self.request(Method::DELETE, &path, Some(token))?)
            .await;
        self.invalidate(Resource::Products).await;
        result
    }

    /// `POST /products/{id}/images` (multipart field `images`)
    #[instrument(skip(self, token, upload), fields(file = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload_product_image(
        &self,
        token: &str,
        id: &ProductId,
        upload: Upload,
    ) -> Result<(), ApiError> {
        let path = format!("products/{}/images", segment(id.as_str()));
        let form = reqwest::multipart::Form::new().part("images", upload.into_part()?);
        let result = self
            .send_empty(self.request(Method::POST, &path, Some(token))?.multipart(form))
            .await;
        self.invalidate(Resource::Products).await;
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bloomway_core::{CategoryId, Price};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::tests::client_for;

    fn catalog_json() -> serde_json::Value {
        json!([
            {"_id": "p1", "name": "Red Roses", "price": 80, "category": "bouquets", "city": "Seattle"},
            {"_id": "p2", "name": "Tulips", "price": 30, "category": "bouquets"}
        ])
    }

    fn input() -> ProductInput {
        ProductInput {
            name: "Peonies".to_string(),
            description: String::new(),
            price: Price::from_cents(4_000),
            category: CategoryId::new("bouquets"),
            store: None,
            images: Vec::new(),
            is_featured: false,
            is_best_seller: false,
            colors: Vec::new(),
            occasions: Vec::new(),
            city: None,
        }
    }

    #[tokio::test]
    async fn test_products_are_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let first = client.products().await.unwrap();
        let second = client.products().await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_mutation_refetches_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/products"))
            .and(header("authorization", "Bearer staff-token"))
            .respond_with(ResponseTemplate::new(201).set_body_json(
                json!({"_id": "p3", "name": "Peonies", "price": 40, "category": "bouquets"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.products().await.unwrap();
        let created = client.create_product("staff-token", &input()).await.unwrap();
        assert_eq!(created.id, ProductId::new("p3"));
        client.products().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_mutation_still_invalidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/featured"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/products/p1"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.featured_products().await.unwrap();
        let err = client
            .delete_product("t", &ProductId::new("p1"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::FORBIDDEN));
        client.featured_products().await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/bestsellers"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.best_sellers().await.unwrap_err().is_server_error());
        assert!(client.best_sellers().await.unwrap_err().is_server_error());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/p9"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .product(&ProductId::new("p9"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Server { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_network_error() {
        let client = crate::api::ApiClient::new(
            url::Url::parse("http://127.0.0.1:9/api/").unwrap(),
            std::time::Duration::from_secs(1),
        );
        let err = client.products().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "{err:?}");
    }
}
