//! Test harness for the Bloomway storefront.
//!
//! Each [`TestApp`] runs the real router in-process (via `oneshot`) against
//! its own `wiremock` server standing in for the REST API.
//!
//! ```rust,ignore
//! let app = TestApp::start().await;
//! let cookie = app.sign_in("admin").await;
//! let page = app.get("/admin/users", Some(&cookie)).await;
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use bloomway_storefront::config::StorefrontConfig;
use bloomway_storefront::middleware::session::SESSION_COOKIE_NAME;
use bloomway_storefront::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The storefront wired to a mock API.
pub struct TestApp {
    pub api: MockServer,
    router: Router,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// `name=value` of the session cookie, if this response set one.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            .map(str::to_string)
    }
}

/// A user record as the API returns it.
#[must_use]
pub fn user_json(id: &str, name: &str, role: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "email": format!("{id}@example.com"),
        "role": role,
        "status": "active"
    })
}

/// A product record as the API returns it.
#[must_use]
pub fn product_json(id: &str, name: &str, price: f64, city: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "price": price,
        "category": "bouquets",
        "city": city,
        "images": []
    })
}

impl TestApp {
    pub async fn start() -> Self {
        let api = MockServer::start().await;
        let config = StorefrontConfig::for_api(&format!("{}/api/", api.uri())).unwrap();
        let router = bloomway_storefront::app(AppState::new(config));
        Self { api, router }
    }

    /// Answer `GET /api{endpoint}` with `body`.
    pub async fn mock_get(&self, endpoint: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api{endpoint}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.api)
            .await;
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(form.to_string())).unwrap())
            .await
    }

    /// Sign in through the login form as a user with `role` and return the
    /// session cookie.
    pub async fn sign_in(&self, role: &str) -> String {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": format!("token-{role}"),
                "user": user_json(role, "Ann", role),
            })))
            .mount(&self.api)
            .await;

        let response = self
            .post_form("/login", "email=ann%40example.com&password=secret", None)
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        response.session_cookie().unwrap()
    }
}
