//! REST API client.
//!
//! One [`ApiClient`] serves every resource; each resource's endpoints live in
//! their own module as an `impl ApiClient` block. Public catalog reads are
//! cached in `moka` and dropped whenever the same resource is mutated.

mod auth;
mod cache;
mod categories;
mod error;
mod favorites;
mod otp;
mod products;
mod stores;
mod uploads;
mod users;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub use cache::{CacheKey, CacheValue, Resource};
pub use error::{ApiError, GENERIC_NETWORK_MESSAGE, GENERIC_SERVER_MESSAGE};
pub use uploads::Upload;

use cache::Cached;

/// Client for the Bloomway REST API.
///
/// Cheap to clone; clones share the connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client rooted at `base` (which should end in `/`).
    #[must_use]
    pub fn new(base: Url, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base,
                cache,
            }),
        }
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }

    /// Absolute URL for an endpoint path such as `products/featured`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Setup` if the path cannot be joined onto the base.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base.join(path.trim_start_matches('/'))?)
    }

    /// Browser-facing URL for an image reference returned by the API.
    ///
    /// Absolute URLs pass through; server-relative ones (`/uploads/x.jpg`)
    /// resolve against the API host.
    #[must_use]
    pub fn asset_url(&self, reference: &str) -> String {
        if Url::parse(reference).is_ok() {
            return reference.to_string();
        }
        self.inner
            .base
            .join(reference)
            .map_or_else(|_| reference.to_string(), String::from)
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder, ApiError> {
        let builder = self.inner.http.request(method, self.url(path)?);
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a request and decode its JSON body.
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(%status, body = %truncate(&body), "API returned error status");
            return Err(ApiError::from_response(status, &body));
        }

        serde_json::from_str::<Envelope<T>>(&body)
            .map(Envelope::into_inner)
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    body = %truncate(&body),
                    "Failed to decode API response"
                );
                ApiError::Server {
                    status,
                    message: format!("invalid response body: {e}"),
                    code: None,
                }
            })
    }

    /// Send a request whose response body is irrelevant.
    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status, &body))
    }

    /// Return the cached value for `key`, or run `fetch` and cache its result.
    async fn cached<T, F>(&self, key: CacheKey, fetch: F) -> Result<Arc<T>, ApiError>
    where
        T: Cached,
        F: Future<Output = Result<T, ApiError>>,
    {
        if let Some(value) = self.inner.cache.get(&key).await.and_then(T::unwrap) {
            debug!(?key, "cache hit");
            return Ok(value);
        }

        let value = Arc::new(fetch.await?);
        self.inner
            .cache
            .insert(key, T::wrap(Arc::clone(&value)))
            .await;
        Ok(value)
    }

    /// Drop every cached entry of `resource`.
    pub async fn invalidate(&self, resource: Resource) {
        let stale: Vec<Arc<CacheKey>> = self
            .inner
            .cache
            .iter()
            .filter(|(key, _)| key.resource() == resource)
            .map(|(key, _)| key)
            .collect();
        debug!(?resource, entries = stale.len(), "invalidating cache");
        for key in stale {
            self.inner.cache.invalidate(key.as_ref()).await;
        }
    }
}

/// Percent-encode an id for use as a path segment.
fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

fn truncate(body: &str) -> String {
    body.chars().take(500).collect()
}

/// Responses arrive either bare or wrapped in an object keyed by the resource.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped {
        #[serde(
            alias = "items",
            alias = "products",
            alias = "product",
            alias = "stores",
            alias = "store",
            alias = "categories",
            alias = "category",
            alias = "users",
            alias = "user",
            alias = "favorites"
        )]
        data: T,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use bloomway_core::models::Product;

    pub(crate) fn client_for(server: &wiremock::MockServer) -> ApiClient {
        let base = Url::parse(&format!("{}/api/", server.uri())).unwrap();
        ApiClient::new(base, Duration::from_secs(60))
    }

    #[test]
    fn test_url_stays_under_base_path() {
        let client = ApiClient::new(
            Url::parse("http://localhost:5000/api/").unwrap(),
            Duration::from_secs(1),
        );
        assert_eq!(
            client.url("/products/featured").unwrap().as_str(),
            "http://localhost:5000/api/products/featured"
        );
        assert_eq!(
            client.url("stores/my").unwrap().as_str(),
            "http://localhost:5000/api/stores/my"
        );
    }

    #[test]
    fn test_asset_url_resolves_against_api_host() {
        let client = ApiClient::new(
            Url::parse("http://localhost:5000/api/").unwrap(),
            Duration::from_secs(1),
        );
        assert_eq!(
            client.asset_url("/uploads/rose.jpg"),
            "http://localhost:5000/uploads/rose.jpg"
        );
        assert_eq!(
            client.asset_url("https://cdn.example.com/tulip.png"),
            "https://cdn.example.com/tulip.png"
        );
    }

    #[test]
    fn test_segment_escapes_slashes() {
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_envelope_accepts_bare_and_wrapped() {
        let bare: Envelope<Vec<Product>> = serde_json::from_str(
            r#"[{"_id":"p1","name":"Roses","price":10,"category":"c1"}]"#,
        )
        .unwrap();
        assert_eq!(bare.into_inner().len(), 1);

        let wrapped: Envelope<Vec<Product>> = serde_json::from_str(
            r#"{"products":[{"_id":"p1","name":"Roses","price":"10.50","category":{"_id":"c1"}}],"total":1}"#,
        )
        .unwrap();
        let products = wrapped.into_inner();
        assert_eq!(products[0].category.as_str(), "c1");
    }
}
