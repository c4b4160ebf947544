//! Bloomway storefront library.
//!
//! Server-rendered flower shop in front of the Bloomway REST API. The router
//! is built here so the binary and the integration tests share it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    RateLimiterLayer, create_session_layer, csp_nonce_middleware, request_id_middleware,
    security_headers_middleware, session_expiry_middleware,
};
use crate::state::AppState;

/// Build the full application without rate limiting.
pub fn app(state: AppState) -> Router {
    app_with_limiter(state, None)
}

/// Build the full application. `auth_limiter` guards the sign-in routes.
///
/// Layers, outermost first: tracing span, request id, CSP nonce, security
/// headers, session, session expiry.
pub fn app_with_limiter(state: AppState, auth_limiter: Option<RateLimiterLayer>) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes(auth_limiter))
        .nest_service(
            "/static",
            ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
        )
        .layer(from_fn(session_expiry_middleware))
        .layer(session_layer)
        .layer(from_fn_with_state(state.clone(), security_headers_middleware))
        .layer(from_fn(csp_nonce_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness check. Does not call the API.
async fn health() -> &'static str {
    "ok"
}
