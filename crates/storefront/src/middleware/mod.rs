//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (recorded on the span, echoed in `x-request-id`)
//! 4. CSP nonce (per-request nonce for inline scripts)
//! 5. Security headers (CSP with the nonce, frame/referrer policies)
//! 6. Session layer (tower-sessions, in-memory store)
//! 7. Session expiry (signs out when a handler saw an API 401)
//! 8. Rate limiting on auth routes (governor)

pub mod auth;
pub mod csp;
pub mod page;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAdmin, RequireAuth, RequireStaff, clear_current_user, set_current_user,
};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use page::Page;
pub use rate_limit::{RateLimiterLayer, auth_rate_limiter, general_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SessionExpired, create_session_layer, session_expiry_middleware};
