//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in user, or an admin, in route
//! handlers.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::ProfileRepository;
use crate::error::{AppError, LOGIN_PATH};
use crate::models::{CurrentUser, Profile, session_keys};
use crate::services::session::{ProfileLookup, SessionEvent, SessionProvider};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// API requests without a user get 401 with a `redirect` to the login page;
/// other requests are redirected there.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when a route needs a user or an admin.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for non-API requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in, but not an admin.
    Forbidden,
}

impl AuthRejection {
    fn missing_user(parts: &Parts) -> Self {
        if parts.uri.path().starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => {
                AppError::Unauthorized("Sign in required".to_string()).into_response()
            }
            Self::Forbidden => {
                AppError::Forbidden("Admin access required".to_string()).into_response()
            }
        }
    }
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::missing_user(parts))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await))
    }
}

/// Extractor that requires an admin.
///
/// The profile is re-read from the database on every admin request, so a
/// demotion takes effect immediately. A failed lookup is treated as not admin.
pub struct RequireAdmin {
    pub user: CurrentUser,
    pub profile: Profile,
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_admin(parts, ProfileRepository::new(state.pool())).await
    }
}

/// Refresh the session profile through `profiles` and admit only admins.
pub(crate) async fn require_admin<P: ProfileLookup>(
    parts: &Parts,
    profiles: P,
) -> Result<RequireAdmin, AuthRejection> {
    let Some(session) = parts.extensions.get::<Session>().cloned() else {
        return Err(AuthRejection::missing_user(parts));
    };
    let provider = SessionProvider::new(&session, profiles);
    let snapshot = provider
        .apply(SessionEvent::ProfileChanged)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Could not refresh profile for admin check");
            AuthRejection::Forbidden
        })?;

    let is_admin = snapshot.is_admin();
    match (snapshot.user, snapshot.profile) {
        (None, _) => Err(AuthRejection::missing_user(parts)),
        (Some(user), Some(profile)) if is_admin => Ok(RequireAdmin { user, profile }),
        (Some(user), _) => {
            tracing::info!(user_id = %user.id, "Non-admin denied admin route");
            Err(AuthRejection::Forbidden)
        }
    }
}
