//! Session-related types.
//!
//! Everything the storefront remembers about a visitor lives in the session:
//! the signed-in user with their API token, the cart, the chosen language,
//! a pending sign-up, and at most one flash message.

use bloomway_core::models::{AuthResponse, User};
use bloomway_core::{Email, Role, UserId};
use serde::{Deserialize, Serialize};

/// Session-stored user identity.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    token: String,
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl CurrentUser {
    #[must_use]
    pub fn new(user: User, token: String) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            token,
        }
    }

    /// Bearer token for API calls made on this user's behalf.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<AuthResponse> for CurrentUser {
    fn from(auth: AuthResponse) -> Self {
        Self::new(auth.user, auth.token)
    }
}

/// Sign-up details held between sending the email code and verifying it.
#[derive(Clone, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub return_to: Option<String>,
}

impl std::fmt::Debug for PendingRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRegistration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// Tone of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    /// CSS modifier class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A one-shot notification shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// The signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// The visitor's cart.
    pub const CART: &str = "cart";

    /// The visitor's chosen language.
    pub const LANGUAGE: &str = "language";

    /// Flash message for the next page.
    pub const FLASH: &str = "flash";

    /// Sign-up awaiting email verification.
    pub const PENDING_REGISTRATION: &str = "pending_registration";

    /// Where to land after the Google sign-in round trip.
    pub const OAUTH_RETURN_TO: &str = "oauth_return_to";
}
