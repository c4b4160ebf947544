//! Authentication and role-gating extractors.
//!
//! Each extractor resolves the session's user against an
//! [`AccessPolicy`]: signed-out visitors are sent to the login page with the
//! current path as `return_to`, signed-in visitors without the role go to the
//! unauthorized page.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use bloomway_core::access::{self, Access, AccessPolicy};
use tower_sessions::Session;

use crate::middleware::session::return_path;
use crate::models::{CurrentUser, session_keys};

/// Error returned when a gate turns the visitor away.
#[derive(Debug)]
pub enum AuthRejection {
    /// Send the browser elsewhere (login or unauthorized page).
    Redirect(String),
    /// The session layer is not installed.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(target) => Redirect::to(&target).into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

async fn gate(parts: &Parts, policy: AccessPolicy) -> Result<CurrentUser, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::MissingSession)?;
    let user = current_user(session).await;
    let here = return_path(&parts.method, &parts.uri, &parts.headers);

    match (access::check(policy, user.as_ref().map(|u| u.role), &here), user) {
        (Access::Granted, Some(user)) => Ok(user),
        (denied, _) => {
            let target = denied
                .redirect()
                .unwrap_or_else(|| access::LOGIN_PATH.to_string());
            tracing::debug!(?policy, %target, "access gate redirect");
            Err(AuthRejection::Redirect(target))
        }
    }
}

macro_rules! gated_extractor {
    ($(#[$doc:meta])* $name:ident => $policy:expr) => {
        $(#[$doc])*
        pub struct $name(pub CurrentUser);

        impl<S> FromRequestParts<S> for $name
        where
            S: Send + Sync,
        {
            type Rejection = AuthRejection;

            async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
                gate(parts, $policy).await.map(Self)
            }
        }
    };
}

gated_extractor!(
    /// Any signed-in user.
    RequireAuth => AccessPolicy::Authenticated
);
gated_extractor!(
    /// Managers and admins.
    RequireStaff => AccessPolicy::Staff
);
gated_extractor!(
    /// Admins only.
    RequireAdmin => AccessPolicy::Admin
);

/// Extractor that optionally gets the current user.
///
/// Unlike the gated extractors, this never rejects the request.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => current_user(session).await,
            None => None,
        };
        Ok(Self(user))
    }
}

/// The signed-in user stored in `session`, if any.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Store the signed-in user, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the signed-in user from the session (logout). The cart and
/// language survive.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, header::LOCATION},
        routing::get,
    };
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;

    async fn staff_only(RequireStaff(user): RequireStaff) -> String {
        user.name
    }

    fn app() -> Router {
        Router::new()
            .route("/profile/stores", get(staff_only))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn test_signed_out_visitor_is_sent_to_login() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/profile/stores?page=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/login?return_to=%2Fprofile%2Fstores%3Fpage%3D2"
        );
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_server_error() {
        let app = Router::new().route("/profile/stores", get(staff_only));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/profile/stores")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
