//! Authentication route handlers.
//!
//! Sign-in and sign-out go through the session provider so the session id
//! is cycled and the profile is loaded in one place.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use harbor_shop_core::validation::{LoginInput, RegistrationInput};

use crate::db::ProfileRepository;
use crate::error::{Result, add_breadcrumb};
use crate::routes::session::SessionView;
use crate::services::auth::{AuthError, AuthService};
use crate::services::notices::Notices;
use crate::services::session::{SessionEvent, SessionProvider};
use crate::state::AppState;

/// Notice text for a failed sign-in or sign-up.
fn failure_notice(error: &AuthError) -> String {
    match error {
        AuthError::Validation(errors) => errors.to_string(),
        AuthError::InvalidCredentials => "Invalid email or password".to_string(),
        AuthError::UserAlreadyExists => "An account with this email already exists".to_string(),
        AuthError::Repository(_) | AuthError::PasswordHash => {
            "Something went wrong, please try again".to_string()
        }
    }
}

/// Handle registration and sign the new user in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<RegistrationInput>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let notices = Notices::new(&session);
    let user = match AuthService::new(state.pool()).register(input).await {
        Ok(user) => user,
        Err(e) => {
            notices.error(failure_notice(&e)).await;
            return Err(e.into());
        }
    };

    let snapshot = SessionProvider::new(&session, ProfileRepository::new(state.pool()))
        .apply(SessionEvent::SignedIn(user.to_current_user()))
        .await?;
    notices.success("Registration successful!").await;
    add_breadcrumb("auth", "Registered", None);

    Ok((StatusCode::CREATED, Json(snapshot.into())))
}

/// Handle login.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<LoginInput>,
) -> Result<Json<SessionView>> {
    let notices = Notices::new(&session);
    let user = match AuthService::new(state.pool()).login(&input).await {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(error = %e, "Login failed");
            notices.error(failure_notice(&e)).await;
            return Err(e.into());
        }
    };

    let snapshot = SessionProvider::new(&session, ProfileRepository::new(state.pool()))
        .apply(SessionEvent::SignedIn(user.to_current_user()))
        .await?;
    notices.success("Login successful!").await;
    add_breadcrumb("auth", "Signed in", None);

    Ok(Json(snapshot.into()))
}

/// Handle logout. The cart stays with the browser session.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Json<SessionView>> {
    let snapshot = SessionProvider::new(&session, ProfileRepository::new(state.pool()))
        .apply(SessionEvent::SignedOut)
        .await?;
    Ok(Json(snapshot.into()))
}
