//! Role gating for protected pages.
//!
//! Every protected route resolves to one of three outcomes: the visitor is let
//! through, sent to the login page with the current path as `return_to`, or
//! sent to the unauthorized page.

use url::form_urlencoded;

use crate::types::Role;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Path of the page shown when the role does not match.
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Who may open a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any signed-in user.
    Authenticated,
    /// Managers and admins.
    Staff,
    /// Admins only.
    Admin,
}

impl AccessPolicy {
    /// Whether a signed-in user with `role` passes this policy.
    #[must_use]
    pub const fn allows(self, role: Role) -> bool {
        match self {
            Self::Authenticated => true,
            Self::Staff => role.is_staff(),
            Self::Admin => role.is_admin(),
        }
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Not signed in; come back to `return_to` after login.
    Login { return_to: String },
    /// Signed in without the required role.
    Denied,
}

impl Access {
    /// Where to redirect, if anywhere.
    #[must_use]
    pub fn redirect(&self) -> Option<String> {
        match self {
            Self::Granted => None,
            Self::Login { return_to } => Some(login_redirect(return_to)),
            Self::Denied => Some(UNAUTHORIZED_PATH.to_string()),
        }
    }
}

/// Decide access for a visitor whose role is `role` (`None` when signed out)
/// requesting `path_and_query`.
#[must_use]
pub fn check(policy: AccessPolicy, role: Option<Role>, path_and_query: &str) -> Access {
    match role {
        None => Access::Login {
            return_to: path_and_query.to_string(),
        },
        Some(role) if policy.allows(role) => Access::Granted,
        Some(_) => Access::Denied,
    }
}

/// Login URL that returns to `return_to` afterwards.
#[must_use]
pub fn login_redirect(return_to: &str) -> String {
    match sanitize_return_to(Some(return_to)) {
        Some(path) if path != "/" => {
            let encoded: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
            format!("{LOGIN_PATH}?return_to={encoded}")
        }
        _ => LOGIN_PATH.to_string(),
    }
}

/// Accept only same-site absolute paths as post-login destinations.
///
/// Rejects scheme-relative (`//host`) and backslash variants that browsers
/// treat as external, and anything not starting with `/`.
#[must_use]
pub fn sanitize_return_to(return_to: Option<&str>) -> Option<&str> {
    let path = return_to?.trim();
    let external = path.starts_with("//") || path.starts_with("/\\") || path.contains("://");
    (path.starts_with('/') && !external).then_some(path)
}
