//! Language switcher.

use axum::{
    Form,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use bloomway_core::access::sanitize_return_to;
use bloomway_core::i18n::Language;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::session::{referer_path, set_language};

#[derive(Debug, Deserialize)]
pub struct LanguageForm {
    pub language: String,
    pub return_to: Option<String>,
}

/// Remember the chosen language and go back to the page it was chosen on.
#[instrument(skip(session, headers))]
pub async fn set(
    session: Session,
    headers: HeaderMap,
    Form(form): Form<LanguageForm>,
) -> Result<Response> {
    let language: Language = form.language.parse().map_err(AppError::BadRequest)?;
    set_language(&session, language).await?;

    let back = sanitize_return_to(form.return_to.as_deref())
        .map(str::to_string)
        .or_else(|| referer_path(&headers))
        .unwrap_or_else(|| "/".to_string());
    Ok(Redirect::to(&back).into_response())
}
