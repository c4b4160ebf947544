//! User records.

use serde::{Deserialize, Serialize};

use crate::types::{Email, Role, UserId, UserStatus};

/// A user account as returned by the REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
}

/// Successful login, registration or OAuth exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_and_status_default() {
        let user: User =
            serde_json::from_str(r#"{"_id": "u1", "name": "Ann", "email": "ann@example.com"}"#)
                .unwrap();
        assert_eq!(user.role, Role::Customer);
        assert_eq!(user.status, UserStatus::Active);
    }

    #[test]
    fn test_auth_response() {
        let json = r#"{"token": "jwt", "user": {"id": "u2", "name": "Bo", "email": "bo@example.com", "role": "manager"}}"#;
        let auth: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(auth.user.role, Role::Manager);
        assert_eq!(auth.token, "jwt");
    }
}
