//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BLOOMWAY_API_URL` - Base URL of the REST API, including the `/api` prefix
//! - `BLOOMWAY_BASE_URL` - Public URL of the storefront
//!
//! ## Optional
//! - `BLOOMWAY_HOST` - Bind address (default: 127.0.0.1)
//! - `BLOOMWAY_PORT` - Listen port (default: 3000)
//! - `BLOOMWAY_CACHE_TTL_SECS` - Catalog cache lifetime (default: 60)
//! - `BLOOMWAY_DEFAULT_LANGUAGE` - `en` or `es` (default: en)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0 to 1.0 (default: 0.0)
//!
//! ## Operator tooling
//! - `BLOOMWAY_API_TOKEN` - Bearer token for the CLI, see [`ApiCredentials`]

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use bloomway_core::i18n::Language;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_TOKEN_LENGTH: usize = 20;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "insert",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST API base, always ending in `/`
    pub api_url: Url,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// How long catalog reads stay cached
    pub cache_ttl: Duration,
    /// Language for visitors who have not picked one
    pub default_language: Language,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url("BLOOMWAY_API_URL", &get_required_env("BLOOMWAY_API_URL")?)?;
        let host = get_env_or_default("BLOOMWAY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BLOOMWAY_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BLOOMWAY_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BLOOMWAY_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("BLOOMWAY_BASE_URL")?;
        let cache_ttl = get_env_or_default("BLOOMWAY_CACHE_TTL_SECS", "60")
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BLOOMWAY_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;
        let default_language = get_env_or_default("BLOOMWAY_DEFAULT_LANGUAGE", "en")
            .parse::<Language>()
            .map_err(|e| ConfigError::InvalidEnvVar("BLOOMWAY_DEFAULT_LANGUAGE".to_string(), e))?;

        Ok(Self {
            api_url,
            host,
            port,
            base_url,
            cache_ttl,
            default_language,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Configuration pointing at `api_url`, with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an http(s) URL.
    pub fn for_api(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("api_url", api_url)?,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            cache_ttl: Duration::from_secs(60),
            default_language: Language::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// API location and bearer token for operator tooling.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_url: Url,
    pub token: SecretString,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_url", &self.api_url.as_str())
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ApiCredentials {
    /// Load `BLOOMWAY_API_URL` and `BLOOMWAY_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either is missing, the URL is invalid, or the
    /// token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url("BLOOMWAY_API_URL", &get_required_env("BLOOMWAY_API_URL")?)?;
        let token = get_validated_secret("BLOOMWAY_API_TOKEN")?;
        Ok(Self { api_url, token })
    }
}

/// Load just `BLOOMWAY_API_URL`, for tools that only read public data.
///
/// # Errors
///
/// Returns `ConfigError` if the variable is missing or not an http(s) URL.
pub fn api_url_from_env() -> Result<Url, ConfigError> {
    let _ = dotenvy::dotenv();
    parse_api_url("BLOOMWAY_API_URL", &get_required_env("BLOOMWAY_API_URL")?)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ))
    }
}

/// Parse the API base URL, normalising it to end in `/` so relative joins
/// stay under the `/api` prefix.
fn parse_api_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholders, short values and low-entropy values.
fn validate_secret_strength(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_TOKEN_LENGTH} characters (got {})",
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let secret = SecretString::from(get_required_env(key)?);
    validate_secret_strength(&secret, key)?;
    Ok(secret)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength() {
        let placeholder = SecretString::from("your-api-token-goes-right-here");
        assert!(matches!(
            validate_secret_strength(&placeholder, "T"),
            Err(ConfigError::InsecureSecret(_, _))
        ));

        let short = SecretString::from("aB3$xY9!");
        assert!(validate_secret_strength(&short, "T").is_err());

        let flat = SecretString::from("a".repeat(40));
        assert!(validate_secret_strength(&flat, "T").is_err());

        let jwt_like = SecretString::from("eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiI2NWYxIn0.kq7Vd2mPz");
        assert!(validate_secret_strength(&jwt_like, "T").is_ok());
    }

    #[test]
    fn test_parse_api_url_appends_slash() {
        let url = parse_api_url("K", "http://localhost:5000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/");
        assert_eq!(url.join("products").unwrap().path(), "/api/products");

        let already = parse_api_url("K", "https://shop.example/api/").unwrap();
        assert_eq!(already.path(), "/api/");
    }

    #[test]
    fn test_parse_api_url_rejects_bad_input() {
        assert!(parse_api_url("K", "not a url").is_err());
        assert!(parse_api_url("K", "ftp://files.example/api").is_err());
    }

    #[test]
    fn test_for_api_defaults() {
        let config = StorefrontConfig::for_api("http://127.0.0.1:9000/api").unwrap();
        assert_eq!(config.socket_addr().port(), 3000);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.default_language, Language::En);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let credentials = ApiCredentials {
            api_url: Url::parse("http://localhost:5000/api/").unwrap(),
            token: SecretString::from("super_secret_bearer_token"),
        };
        let debug_output = format!("{credentials:?}");
        assert!(debug_output.contains("localhost:5000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_bearer_token"));
    }
}
