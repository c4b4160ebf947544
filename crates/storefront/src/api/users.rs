//! `/users` endpoints (admin only on the API side).

use bloomway_core::models::User;
use bloomway_core::{UserId, UserStatus};
use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use super::{ApiClient, ApiError, segment};

impl ApiClient {
    /// `GET /users`
    #[instrument(skip_all)]
    pub async fn users(&self, token: &str) -> Result<Vec<User>, ApiError> {
        self.send_json(self.request(Method::GET, "users", Some(token))?)
            .await
    }

    /// `PATCH /users/{id}/status`
    #[instrument(skip(self, token))]
    pub async fn set_user_status(
        &self,
        token: &str,
        id: &UserId,
        status: UserStatus,
    ) -> Result<(), ApiError> {
        let path = format!("users/{}/status", segment(id.as_str()));
        let body = json!({ "status": status });
        self.send_empty(self.request(Method::PATCH, &path, Some(token))?.json(&body))
            .await
    }
}
