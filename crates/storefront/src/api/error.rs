//! Normalised REST API failures.
//!
//! Every failed call lands in exactly one bucket: the API answered with an
//! error status, the API could not be reached, or the request could not be
//! built in the first place.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Text shown for failures that are not the visitor's fault.
pub const GENERIC_SERVER_MESSAGE: &str = "Something went wrong on our side. Please try again later.";

/// Text shown when the API is unreachable.
pub const GENERIC_NETWORK_MESSAGE: &str = "The shop is unreachable right now. Please try again.";

/// A failed REST call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API responded with a non-success status, or with a body that could
    /// not be decoded.
    #[error("API responded {status}: {message}")]
    Server {
        status: StatusCode,
        message: String,
        code: Option<String>,
    },

    /// No response: connection refused, DNS failure, timeout, broken body stream.
    #[error("API unreachable: {0}")]
    Network(String),

    /// The request could not be constructed.
    #[error("Request setup failed: {0}")]
    Setup(String),
}

/// Error body the API sends alongside non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "error")]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ApiError {
    /// Build a `Server` error from a status and raw body text.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        Self::Server {
            status,
            message,
            code: parsed.code,
        }
    }

    /// Status of a `Server` error.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Network(_) | Self::Setup(_) => None,
        }
    }

    /// The API rejected the bearer token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// 5xx from the API.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }

    /// Whether this failure should be reported to error tracking.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        match self {
            Self::Server { status, .. } => status.is_server_error(),
            Self::Network(_) | Self::Setup(_) => true,
        }
    }

    /// Text for the toast shown to the visitor.
    ///
    /// Client errors pass the API's own message through; everything else gets
    /// a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server {
                status, message, ..
            } if status.is_client_error() => message.clone(),
            Self::Network(_) => GENERIC_NETWORK_MESSAGE.to_string(),
            Self::Server { .. } | Self::Setup(_) => GENERIC_SERVER_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Setup(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Server {
                status,
                message: err.to_string(),
                code: None,
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        Self::Setup(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_reads_json_body() {
        let err = ApiError::from_response(
            StatusCode::CONFLICT,
            r#"{"message":"Email already registered","code":"EMAIL_TAKEN"}"#,
        );
        match &err {
            ApiError::Server {
                status,
                message,
                code,
            } => {
                assert_eq!(*status, StatusCode::CONFLICT);
                assert_eq!(message, "Email already registered");
                assert_eq!(code.as_deref(), Some("EMAIL_TAKEN"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.user_message(), "Email already registered");
        assert!(!err.is_reportable());
    }

    #[test]
    fn test_from_response_without_body_uses_reason() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, "<html>nope</html>");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "API responded 404 Not Found: Not Found");
    }

    #[test]
    fn test_server_errors_get_generic_message() {
        let err = ApiError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"MongoServerError: E11000"}"#,
        );
        assert!(err.is_server_error());
        assert!(err.is_reportable());
        assert_eq!(err.user_message(), GENERIC_SERVER_MESSAGE);
    }

    #[test]
    fn test_unauthorized() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, "{}");
        assert!(err.is_unauthorized());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_network_and_setup_buckets() {
        let network = ApiError::Network("connection refused".to_string());
        assert_eq!(network.status(), None);
        assert_eq!(network.user_message(), GENERIC_NETWORK_MESSAGE);

        let setup: ApiError = url::Url::parse("::").unwrap_err().into();
        assert!(matches!(setup, ApiError::Setup(_)));
        assert_eq!(setup.user_message(), GENERIC_SERVER_MESSAGE);
    }
}
