//! Account route handlers.

use axum::{Json, extract::State};
use tower_sessions::Session;
use tracing::instrument;

use harbor_shop_core::validation::ProfileUpdate;

use crate::db::ProfileRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::routes::session::SessionView;
use crate::services::account::AccountService;
use crate::services::session::{SessionEvent, SessionProvider};
use crate::state::AppState;

/// The signed-in user with a freshly loaded profile.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Json<SessionView>> {
    let snapshot = SessionProvider::new(&session, ProfileRepository::new(state.pool()))
        .apply(SessionEvent::ProfileChanged)
        .await?;
    Ok(Json(snapshot.into()))
}

/// Update display name and avatar.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<SessionView>> {
    let snapshot = AccountService::new(ProfileRepository::new(state.pool()), &session)
        .update_profile(user.id, update)
        .await?;
    Ok(Json(snapshot.into()))
}
