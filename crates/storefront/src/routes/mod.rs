//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Home: featured + best sellers
//! GET  /catalog                    - Filtered, sorted catalog
//! GET  /catalog/{id}               - Product detail
//! GET  /stores                     - Store locator
//!
//! # Cart (session)
//! GET  /cart                       - Cart page
//! POST /cart/add|update|remove|clear
//!
//! # Favorites (requires auth)
//! GET  /favorites
//! POST /favorites/{id}/toggle
//! POST /favorites/clear
//!
//! # Auth (rate limited)
//! GET|POST /login
//! GET|POST /register               - Step 1: email a code
//! GET|POST /register/verify        - Step 2: check the code, create account
//! GET  /auth/google                - Hand off to the API's Google sign-in
//! GET  /auth/google/callback       - Token -> session
//! POST /logout
//!
//! POST /language                   - Switch language
//! GET  /unauthorized
//!
//! # Profile (requires auth; stores/products require staff)
//! GET  /profile
//! /profile/stores/...              - Store CRUD with opening hours
//! /profile/products/...            - Product CRUD with image upload
//!
//! # Admin (requires admin)
//! /admin/categories/...            - Category tree with inline CRUD
//! /admin/users/...                 - User list and status toggle
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod favorites;
pub mod forms;
pub mod home;
pub mod language;
pub mod profile;
pub mod stores;

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use bloomway_core::i18n::Labels;
use tower_sessions::Session;

use crate::api::ApiError;
use crate::error::AppError;
use crate::middleware::{RateLimiterLayer, session};
use crate::models::Flash;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route(
            "/register/verify",
            get(auth::verify_page).post(auth::verify),
        )
        .route("/auth/google", get(auth::google))
        .route("/auth/google/callback", get(auth::google_callback))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{id}", get(catalog::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the favorites routes router.
pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::index))
        .route("/{id}/toggle", post(favorites::toggle))
        .route("/clear", post(favorites::clear))
}

/// Create all routes for the storefront.
///
/// `auth_limiter` guards the sign-in, sign-up and code entry routes.
pub fn routes(auth_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let auth = match auth_limiter {
        Some(limiter) => auth_routes().layer(limiter),
        None => auth_routes(),
    };

    Router::new()
        .route("/", get(home::home))
        .nest("/catalog", catalog_routes())
        .route("/stores", get(stores::index))
        .nest("/cart", cart_routes())
        .nest("/favorites", favorite_routes())
        .merge(auth)
        .route("/logout", post(auth::logout))
        .route("/language", post(language::set))
        .route("/unauthorized", get(auth::unauthorized))
        .nest("/profile", profile::routes())
        .nest("/admin", admin::routes())
}

// =============================================================================
// Handler helpers
// =============================================================================

/// Labels in the visitor's language.
pub(crate) async fn labels(state: &AppState, session: &Session) -> &'static Labels {
    session::language(session, state.config().default_language)
        .await
        .labels()
}

/// Queue `flash` and redirect to `to`.
pub(crate) async fn redirect_with(session: &Session, flash: Flash, to: &str) -> Response {
    session::push_flash(session, flash).await;
    Redirect::to(to).into_response()
}

/// Toast text for a failed API call in the visitor's language.
pub(crate) fn error_message(err: &ApiError, labels: &Labels) -> String {
    match err {
        ApiError::Network(_) => labels.network_error.to_string(),
        ApiError::Server { status, .. } if status.is_client_error() => err.user_message(),
        ApiError::Server { .. } | ApiError::Setup(_) => labels.server_error.to_string(),
    }
}

/// Turn a failed API mutation into an error flash and a redirect to `to`.
///
/// A 401 is returned as an error instead so the session expiry middleware
/// can sign the visitor out.
pub(crate) async fn recover(
    session: &Session,
    labels: &Labels,
    err: ApiError,
    to: &str,
) -> Result<Response, AppError> {
    if err.is_unauthorized() {
        return Err(err.into());
    }
    if err.is_reportable() {
        let event_id = sentry::capture_error(&err);
        tracing::error!(error = %err, sentry_event_id = %event_id, "API mutation failed");
    } else {
        tracing::info!(error = %err, "API rejected mutation");
    }
    Ok(redirect_with(session, Flash::error(error_message(&err, labels)), to).await)
}

#[cfg(test)]
mod tests {
    use bloomway_core::i18n::Language;
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_error_message_is_localized_for_server_errors() {
        let labels = Language::Es.labels();
        let err = ApiError::Server {
            status: StatusCode::BAD_GATEWAY,
            message: "upstream".to_string(),
            code: None,
        };
        assert_eq!(error_message(&err, labels), labels.server_error);
        assert_eq!(
            error_message(&ApiError::Network("refused".to_string()), labels),
            labels.network_error
        );
    }

    #[test]
    fn test_error_message_passes_client_errors_through() {
        let err = ApiError::Server {
            status: StatusCode::CONFLICT,
            message: "Store name already used".to_string(),
            code: Some("DUPLICATE".to_string()),
        };
        assert_eq!(
            error_message(&err, Language::En.labels()),
            "Store name already used"
        );
    }
}
