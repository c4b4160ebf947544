//! CLI command implementations.

pub mod catalog;
pub mod categories;
pub mod stores;
pub mod users;

use std::time::Duration;

use bloomway_storefront::api::{ApiClient, ApiError};
use bloomway_storefront::config::{ApiCredentials, ConfigError, api_url_from_env};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Missing or invalid environment.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A command-line value could not be used.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// A command makes a handful of calls; the cache only has to outlive the run.
const CACHE_TTL: Duration = Duration::from_secs(30);

/// Client for public reads; only `BLOOMWAY_API_URL` is required.
pub fn public_client() -> Result<ApiClient, CommandError> {
    Ok(ApiClient::new(api_url_from_env()?, CACHE_TTL))
}

/// Client and credentials for calls that need a token.
pub fn authenticated_client() -> Result<(ApiClient, ApiCredentials), CommandError> {
    let credentials = ApiCredentials::from_env()?;
    let client = ApiClient::new(credentials.api_url.clone(), CACHE_TTL);
    Ok((client, credentials))
}
