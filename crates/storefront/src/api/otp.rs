//! `/otp` endpoints for email verification during sign-up.

use bloomway_core::Email;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct OtpCheck<'a> {
    email: &'a str,
    #[serde(rename = "otp")]
    code: &'a str,
}

#[derive(Deserialize)]
struct OtpVerdict {
    #[serde(default = "assume_verified", alias = "success", alias = "valid")]
    verified: bool,
}

const fn assume_verified() -> bool {
    true
}

impl ApiClient {
    /// `POST /otp/send`
    #[instrument(skip(self))]
    pub async fn send_otp(&self, email: &Email) -> Result<(), ApiError> {
        let body = json!({ "email": email.as_str() });
        self.send_empty(self.request(Method::POST, "otp/send", None)?.json(&body))
            .await
    }

    /// `POST /otp/verify`. A 2xx without an explicit verdict counts as verified.
    #[instrument(skip(self, code))]
    pub async fn verify_otp(&self, email: &Email, code: &str) -> Result<bool, ApiError> {
        let body = OtpCheck {
            email: email.as_str(),
            code: code.trim(),
        };
        let verdict: OtpVerdict = self
            .send_json(self.request(Method::POST, "otp/verify", None)?.json(&body))
            .await?;
        Ok(verdict.verified)
    }
}
