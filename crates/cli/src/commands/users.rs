//! `users`: list accounts and change their status. Needs an admin token.

use std::str::FromStr;

use bloomway_core::{UserId, UserStatus};
use secrecy::ExposeSecret;

use super::{CommandError, authenticated_client};

pub async fn list() -> Result<(), CommandError> {
    let (api, credentials) = authenticated_client()?;
    let users = api.users(credentials.token.expose_secret()).await?;

    tracing::info!("{} users", users.len());
    for user in &users {
        tracing::info!(
            "{:<8} {:<9} {} <{}>  [{}]",
            user.status,
            user.role,
            user.name,
            user.email.as_str(),
            user.id
        );
    }
    Ok(())
}

pub async fn set_status(id: &str, status: &str) -> Result<(), CommandError> {
    let status = UserStatus::from_str(status).map_err(CommandError::InvalidArgument)?;
    let (api, credentials) = authenticated_client()?;
    let id = UserId::new(id);

    api.set_user_status(credentials.token.expose_secret(), &id, status)
        .await?;
    tracing::info!("User {id} is now {status}");
    Ok(())
}
