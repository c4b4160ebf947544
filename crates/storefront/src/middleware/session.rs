//! Session middleware configuration and session-state helpers.
//!
//! Sessions live in an in-memory store; the cart, language choice and
//! signed-in user survive only as long as the process does.

use axum::{
    extract::Request,
    http::{HeaderMap, Method, Uri, header::REFERER},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use bloomway_core::access::login_redirect;
use bloomway_core::cart::Cart;
use bloomway_core::i18n::Language;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::StorefrontConfig;
use crate::models::{Flash, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bw_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Response marker set when the API rejected the session's token.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpired;

/// Create the session layer backed by an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Clear the signed-in user and send the browser to the login page when any
/// handler hit a 401 from the API.
pub async fn session_expiry_middleware(session: Session, request: Request, next: Next) -> Response {
    let return_to = return_path(request.method(), request.uri(), request.headers());
    let response = next.run(request).await;

    if response.extensions().get::<SessionExpired>().is_none() {
        return response;
    }

    tracing::info!(%return_to, "API rejected session token, signing out");
    if let Err(e) = crate::middleware::clear_current_user(&session).await {
        tracing::warn!(error = %e, "Failed to clear expired session");
    }
    let labels = language(&session, Language::default()).await.labels();
    push_flash(&session, Flash::info(labels.session_expired)).await;
    Redirect::to(&login_redirect(&return_to)).into_response()
}

/// Where the visitor should land after signing in.
///
/// For page loads this is the requested path. Form posts cannot be replayed
/// as a GET, so they return to the page the form was on.
#[must_use]
pub fn return_path(method: &Method, uri: &Uri, headers: &HeaderMap) -> String {
    if method == Method::GET || method == Method::HEAD {
        return uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), ToString::to_string);
    }
    referer_path(headers).unwrap_or_else(|| "/".to_string())
}

/// Path and query of the `Referer` header. The host is dropped, so the result
/// always points back into this site.
#[must_use]
pub fn referer_path(headers: &HeaderMap) -> Option<String> {
    let referer = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| url::Url::parse(v).ok())?;
    Some(match referer.query() {
        Some(query) => format!("{}?{query}", referer.path()),
        None => referer.path().to_string(),
    })
}

// =============================================================================
// Session state helpers
// =============================================================================

/// The visitor's cart; empty when none was stored.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persist the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// The visitor's language, or `default` when none was chosen.
pub async fn language(session: &Session, default: Language) -> Language {
    session
        .get::<Language>(session_keys::LANGUAGE)
        .await
        .ok()
        .flatten()
        .unwrap_or(default)
}

/// Remember the visitor's language.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_language(
    session: &Session,
    language: Language,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::LANGUAGE, language).await
}

/// Queue a flash message for the next rendered page. Replaces any pending one.
pub async fn push_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, &flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take the pending flash message, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_return_path_for_get_keeps_query() {
        let uri: Uri = "/catalog?city=Seattle&sort=price_asc".parse().unwrap();
        assert_eq!(
            return_path(&Method::GET, &uri, &HeaderMap::new()),
            "/catalog?city=Seattle&sort=price_asc"
        );
    }

    #[test]
    fn test_return_path_for_post_uses_referer() {
        let uri: Uri = "/favorites/p1/toggle".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_static("http://localhost:3000/catalog/p1?from=home"),
        );
        assert_eq!(
            return_path(&Method::POST, &uri, &headers),
            "/catalog/p1?from=home"
        );
        assert_eq!(return_path(&Method::POST, &uri, &HeaderMap::new()), "/");
    }
}
