//! User administration: list accounts and block or unblock them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use bloomway_core::i18n::Labels;
use bloomway_core::models::User;
use bloomway_core::{UserId, UserStatus};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{Page, RequireAdmin};
use crate::models::Flash;
use crate::routes::{labels, recover, redirect_with};
use crate::state::AppState;

const USERS_PATH: &str = "/admin/users";

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub is_blocked: bool,
    /// Status the toggle button switches to.
    pub next_status: String,
    pub toggle_label: &'static str,
    /// The signed-in admin's own row has no toggle.
    pub is_self: bool,
}

impl UserRow {
    fn new(user: &User, labels: &Labels, me: &UserId) -> Self {
        let blocked = user.status == UserStatus::Blocked;
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.as_str().to_string(),
            role: user.role.to_string(),
            status: user.status.to_string(),
            is_blocked: blocked,
            next_status: user.status.toggled().to_string(),
            toggle_label: if blocked { labels.unblock } else { labels.block },
            is_self: &user.id == me,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct UsersTemplate {
    pub page: Page,
    pub users: Vec<UserRow>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: UserStatus,
}

/// Every account.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    page: Page,
) -> Result<UsersTemplate> {
    let users = state.api().users(user.token()).await?;
    Ok(UsersTemplate {
        users: users
            .iter()
            .map(|u| UserRow::new(u, page.labels, &user.id))
            .collect(),
        page,
    })
}

/// Set an account's status. Admins cannot block themselves.
#[instrument(skip(state, session, user))]
pub async fn set_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let labels = labels(&state, &session).await;
    let id = UserId::new(id);
    if id == user.id {
        return Ok(redirect_with(&session, Flash::error(labels.invalid_form), USERS_PATH).await);
    }

    match state.api().set_user_status(user.token(), &id, form.status).await {
        Ok(()) => {
            tracing::info!(user_id = %id, status = %form.status, "User status changed");
            Ok(redirect_with(&session, Flash::success(labels.saved), USERS_PATH).await)
        }
        Err(e) => recover(&session, labels, e, USERS_PATH).await,
    }
}
