//! Per-request page chrome shared by every rendered template.

use axum::{extract::FromRequestParts, http::request::Parts};
use bloomway_core::i18n::{Labels, Language};
use tower_sessions::Session;

use crate::middleware::{CspNonce, auth::current_user, session};
use crate::models::{CurrentUser, Flash};
use crate::state::AppState;

/// An entry in the language switcher.
#[derive(Debug, Clone)]
pub struct LanguageOption {
    pub code: &'static str,
    pub name: &'static str,
    pub selected: bool,
}

/// Layout data: who is signed in, which language, cart badge, pending flash.
///
/// Extracting a `Page` consumes the pending flash message, so only handlers
/// that render a full page should take one.
#[derive(Debug, Clone)]
pub struct Page {
    pub user: Option<CurrentUser>,
    pub language: Language,
    pub labels: &'static Labels,
    pub languages: Vec<LanguageOption>,
    pub cart_count: u32,
    pub flash: Option<Flash>,
    pub nonce: String,
    /// Path and query of this request, used as the language switcher's
    /// `return_to`.
    pub path: String,
}

impl Page {
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_staff)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

impl FromRequestParts<AppState> for Page {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let default_language = state.config().default_language;
        let nonce = CspNonce::from_request_parts(parts, state).await?.0;
        let path = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);

        let (user, language, cart_count, flash) = match parts.extensions.get::<Session>() {
            Some(s) => (
                current_user(s).await,
                session::language(s, default_language).await,
                session::load_cart(s).await.item_count(),
                session::take_flash(s).await,
            ),
            None => (None, default_language, 0, None),
        };

        let languages = Language::ALL
            .into_iter()
            .map(|lang| LanguageOption {
                code: lang.code(),
                name: lang.native_name(),
                selected: lang == language,
            })
            .collect();

        Ok(Self {
            user,
            language,
            labels: language.labels(),
            languages,
            cart_count,
            flash,
            nonce,
            path,
        })
    }
}
