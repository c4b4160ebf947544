//! `/auth` endpoints.

use bloomway_core::Email;
use bloomway_core::models::{AuthResponse, User};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct Registration<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// `POST /auth/login`
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<AuthResponse, ApiError> {
        let body = Credentials {
            email: email.as_str(),
            password,
        };
        self.send_json(self.request(Method::POST, "auth/login", None)?.json(&body))
            .await
    }

    /// `POST /auth/register`
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = Registration {
            name,
            email: email.as_str(),
            password,
        };
        self.send_json(self.request(Method::POST, "auth/register", None)?.json(&body))
            .await
    }

    /// `GET /auth/me`: the user a token belongs to.
    #[instrument(skip_all)]
    pub async fn me(&self, token: &str) -> Result<User, ApiError> {
        self.send_json(self.request(Method::GET, "auth/me", Some(token))?)
            .await
    }

    /// Where to send the browser to start Google sign-in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Setup` if the URL cannot be built.
    pub fn google_auth_url(&self, callback: &str) -> Result<Url, ApiError> {
        let mut url = self.url("auth/google")?;
        url.query_pairs_mut().append_pair("redirect", callback);
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::tests::client_for;
    use bloomway_core::Role;

    fn user_json() -> serde_json::Value {
        json!({"_id": "u1", "name": "Ana", "email": "ana@example.com", "role": "manager"})
    }

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"email": "ana@example.com", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"token": "t0k", "user": user_json()})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let auth = client_for(&server)
            .login(&Email::parse("ana@example.com").unwrap(), "pw")
            .await
            .unwrap();
        assert_eq!(auth.token, "t0k");
        assert_eq!(auth.user.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&Email::parse("ana@example.com").unwrap(), "bad")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_me_sends_bearer_token_and_unwraps_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("authorization", "Bearer t0k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json()})))
            .mount(&server)
            .await;

        let user = client_for(&server).me("t0k").await.unwrap();
        assert_eq!(user.name, "Ana");
    }

    #[test]
    fn test_google_auth_url() {
        let client = crate::api::ApiClient::new(
            Url::parse("http://localhost:5000/api/").unwrap(),
            std::time::Duration::from_secs(1),
        );
        let url = client
            .google_auth_url("http://localhost:3000/auth/google/callback")
            .unwrap();
        assert_eq!(url.path(), "/api/auth/google");
        assert_eq!(
            url.query(),
            Some("redirect=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgoogle%2Fcallback")
        );
    }
}
