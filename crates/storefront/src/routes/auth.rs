//! Authentication route handlers.
//!
//! Three ways in: email and password, a two-step sign-up confirmed by an
//! emailed code, and Google sign-in handled by the API. Every path ends with
//! a [`CurrentUser`] (holding the API token) stored in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use bloomway_core::Email;
use bloomway_core::access::sanitize_return_to;
use bloomway_core::i18n::Labels;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, Page, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Flash, PendingRegistration, session_keys};
use crate::routes::{error_message, labels, redirect_with};
use crate::state::AppState;

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub return_to: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub return_to: String,
}

/// Email code form data.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub code: String,
}

/// `?return_to=` on the login and sign-up pages.
#[derive(Debug, Deserialize)]
pub struct ReturnToQuery {
    pub return_to: Option<String>,
}

/// `?token=` (or `?error=`) sent back by the API's Google sign-in.
#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub token: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: Page,
    pub email: String,
    pub return_to: String,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: Page,
    pub name: String,
    pub email: String,
    pub return_to: String,
    pub error: Option<String>,
    pub min_password_len: usize,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/verify.html")]
pub struct VerifyTemplate {
    pub page: Page,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "unauthorized.html")]
pub struct UnauthorizedTemplate {
    pub page: Page,
}

/// A `return_to` value that is safe to redirect to, or empty.
fn safe_return_to(raw: Option<&str>) -> String {
    sanitize_return_to(raw).unwrap_or_default().to_string()
}

/// Sign the visitor in and send them on.
async fn start_session(
    session: &Session,
    labels: &Labels,
    user: CurrentUser,
    return_to: &str,
) -> Result<Response> {
    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, role = %user.role, "User signed in");

    let target = sanitize_return_to(Some(return_to)).unwrap_or("/");
    Ok(redirect_with(session, Flash::success(labels.signed_in), target).await)
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
#[instrument(skip_all)]
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    page: Page,
    Query(query): Query<ReturnToQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/profile").into_response();
    }
    LoginTemplate {
        page,
        email: String::new(),
        return_to: safe_return_to(query.return_to.as_deref()),
        error: None,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    page: Page,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let labels = page.labels;
    let return_to = safe_return_to(Some(&form.return_to));
    let rerender = |page: Page, error: String| {
        LoginTemplate {
            page,
            email: form.email.clone(),
            return_to: return_to.clone(),
            error: Some(error),
        }
        .into_response()
    };

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return Ok(rerender(page, e.to_string())),
    };

    match state.api().login(&email, &form.password).await {
        Ok(auth) => start_session(&session, labels, auth.into(), &return_to).await,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(rerender(page, error_message(&e, labels)))
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
#[instrument(skip_all)]
pub async fn register_page(page: Page, Query(query): Query<ReturnToQuery>) -> RegisterTemplate {
    RegisterTemplate {
        page,
        name: String::new(),
        email: String::new(),
        return_to: safe_return_to(query.return_to.as_deref()),
        error: None,
        min_password_len: MIN_PASSWORD_LEN,
    }
}

/// Step 1: validate the details and email a confirmation code.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    page: Page,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let labels = page.labels;
    let name = form.name.trim().to_string();
    let return_to = safe_return_to(Some(&form.return_to));
    let rerender = |page: Page, error: String| {
        RegisterTemplate {
            page,
            name: name.clone(),
            email: form.email.clone(),
            return_to: return_to.clone(),
            error: Some(error),
            min_password_len: MIN_PASSWORD_LEN,
        }
        .into_response()
    };

    if name.is_empty() {
        return Ok(rerender(page, format!("{}: {}", labels.name, labels.invalid_form)));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Ok(rerender(page, format!("{}: {}", labels.password, labels.invalid_form)));
    }
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return Ok(rerender(page, e.to_string())),
    };

    if let Err(e) = state.api().send_otp(&email).await {
        tracing::warn!(error = %e, "Could not send sign-up code");
        return Ok(rerender(page, error_message(&e, labels)));
    }

    let pending = PendingRegistration {
        name: name.clone(),
        email,
        password: form.password.clone(),
        return_to: Some(return_to.clone()).filter(|r| !r.is_empty()),
    };
    session
        .insert(session_keys::PENDING_REGISTRATION, &pending)
        .await?;

    Ok(redirect_with(&session, Flash::info(labels.code_sent), "/register/verify").await)
}

async fn pending_registration(session: &Session) -> Option<PendingRegistration> {
    session
        .get::<PendingRegistration>(session_keys::PENDING_REGISTRATION)
        .await
        .ok()
        .flatten()
}

/// Display the code entry page.
#[instrument(skip_all)]
pub async fn verify_page(session: Session, page: Page) -> Response {
    match pending_registration(&session).await {
        Some(pending) => VerifyTemplate {
            page,
            email: pending.email.into_inner(),
            error: None,
        }
        .into_response(),
        None => Redirect::to("/register").into_response(),
    }
}

/// Step 2: check the code, create the account and sign in.
#[instrument(skip_all)]
pub async fn verify(
    State(state): State<AppState>,
    session: Session,
    page: Page,
    Form(form): Form<VerifyForm>,
) -> Result<Response> {
    let Some(pending) = pending_registration(&session).await else {
        return Ok(Redirect::to("/register").into_response());
    };
    let labels = page.labels;
    let api = state.api();
    let rerender = |page: Page, error: String| {
        VerifyTemplate {
            page,
            email: pending.email.as_str().to_string(),
            error: Some(error),
        }
        .into_response()
    };

    let code = form.code.trim();
    if code.is_empty() {
        return Ok(rerender(page, labels.invalid_code.to_string()));
    }

    match api.verify_otp(&pending.email, code).await {
        Ok(true) => {}
        Ok(false) => return Ok(rerender(page, labels.invalid_code.to_string())),
        Err(e) => {
            tracing::warn!(error = %e, "Code verification failed");
            return Ok(rerender(page, error_message(&e, labels)));
        }
    }

    let auth = match api
        .register(&pending.name, &pending.email, &pending.password)
        .await
    {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            return Ok(rerender(page, error_message(&e, labels)));
        }
    };

    session
        .remove::<PendingRegistration>(session_keys::PENDING_REGISTRATION)
        .await?;
    let return_to = pending.return_to.clone().unwrap_or_default();
    start_session(&session, labels, auth.into(), &return_to).await
}

// =============================================================================
// Google sign-in
// =============================================================================

/// Redirect to the API's Google sign-in, which returns to our callback.
#[instrument(skip_all)]
pub async fn google(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ReturnToQuery>,
) -> Result<Response> {
    let return_to = safe_return_to(query.return_to.as_deref());
    if !return_to.is_empty() {
        session
            .insert(session_keys::OAUTH_RETURN_TO, &return_to)
            .await?;
    }

    let callback = format!(
        "{}/auth/google/callback",
        state.config().base_url.trim_end_matches('/')
    );
    let url = state.api().google_auth_url(&callback)?;
    Ok(Redirect::to(url.as_str()).into_response())
}

/// Exchange the token from the Google round trip for a session.
#[instrument(skip_all)]
pub async fn google_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let return_to = session
        .remove::<String>(session_keys::OAUTH_RETURN_TO)
        .await?
        .unwrap_or_default();

    let Some(token) = query.token.filter(|t| !t.is_empty()) else {
        tracing::warn!(error = ?query.error, "Google sign-in returned no token");
        let message = query.error.unwrap_or_else(|| labels.server_error.to_string());
        return Ok(redirect_with(&session, Flash::error(message), "/login").await);
    };

    match state.api().me(&token).await {
        Ok(user) => start_session(&session, labels, CurrentUser::new(user, token), &return_to).await,
        Err(e) => {
            tracing::warn!(error = %e, "Google sign-in token rejected");
            Ok(redirect_with(&session, Flash::error(error_message(&e, labels)), "/login").await)
        }
    }
}

// =============================================================================
// Logout and access denied
// =============================================================================

/// Sign out. The cart and language choice stay.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response> {
    let labels = labels(&state, &session).await;
    clear_current_user(&session).await?;
    session
        .remove::<PendingRegistration>(session_keys::PENDING_REGISTRATION)
        .await?;
    clear_sentry_user();
    Ok(redirect_with(&session, Flash::info(labels.signed_out), "/").await)
}

/// Shown when a signed-in user lacks the role for a page.
#[instrument(skip_all)]
pub async fn unauthorized(page: Page) -> impl IntoResponse {
    (
        axum::http::StatusCode::FORBIDDEN,
        UnauthorizedTemplate { page },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_to_drops_external_targets() {
        assert_eq!(safe_return_to(Some("/favorites")), "/favorites");
        assert_eq!(safe_return_to(Some("https://evil.test/")), "");
        assert_eq!(safe_return_to(Some("//evil.test")), "");
        assert_eq!(safe_return_to(None), "");
    }
}
