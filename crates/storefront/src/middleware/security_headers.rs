//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Start locked down and loosen only where the storefront needs it: inline
//! scripts carry the request nonce, and product images may be served by the
//! API host or an https CDN.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::middleware::CspNonce;
use crate::state::AppState;

/// Build the Content-Security-Policy value for one response.
///
/// ```text
/// default-src 'none';
/// script-src 'self' 'nonce-…';
/// style-src 'self';
/// img-src 'self' data: https: <api origin>;
/// form-action 'self';
/// frame-ancestors 'none'; …
/// ```
#[must_use]
pub fn content_security_policy(nonce: Option<&CspNonce>, api_origin: &str, secure: bool) -> String {
    let script_src = nonce.map_or_else(
        || "'self'".to_string(),
        |nonce| format!("'self' {}", nonce.source()),
    );
    let mut policy = format!(
        "default-src 'none'; \
         script-src {script_src}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' data: https: {api_origin}; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    );
    if secure {
        policy.push_str("; upgrade-insecure-requests");
    }
    policy
}

/// Add security headers to all responses.
///
/// `Referrer-Policy` is `same-origin`: form handlers send visitors back to the
/// page they posted from, which needs the same-site `Referer`.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let nonce = request.extensions().get::<CspNonce>().cloned();
    let mut response = next.run(request).await;

    let config = state.config();
    let api_origin = config.api_url.origin().ascii_serialization();
    let policy = content_security_policy(nonce.as_ref(), &api_origin, config.is_secure());

    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(REFERRER_POLICY, HeaderValue::from_static("same-origin"));

    match HeaderValue::from_str(&policy) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid CSP header value");
            headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static("default-src 'none'"));
        }
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             autoplay=(), \
             browsing-topics=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             payment=(), \
             usb=()",
        ),
    );

    // Pages are per-visitor (cart, flash); static assets keep their own policy.
    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );
    // API-hosted images do not send CORP headers.
    headers.insert(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("credentialless"),
    );
    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_includes_nonce_and_api_origin() {
        let nonce = CspNonce("abc123==".to_string());
        let policy = content_security_policy(Some(&nonce), "https://api.bloomway.test", true);
        assert!(policy.contains("script-src 'self' 'nonce-abc123=='"));
        assert!(policy.contains("img-src 'self' data: https: https://api.bloomway.test"));
        assert!(policy.ends_with("upgrade-insecure-requests"));
    }

    #[test]
    fn test_policy_without_nonce_for_plain_http() {
        let policy = content_security_policy(None, "http://localhost:5000", false);
        assert!(policy.contains("script-src 'self';"));
        assert!(!policy.contains("upgrade-insecure-requests"));
    }
}
