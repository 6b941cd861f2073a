//! Session state for the client.

use axum::{Json, extract::State};
use serde::Serialize;
use tower_sessions::Session;

use crate::db::ProfileRepository;
use crate::error::Result;
use crate::models::{CurrentUser, Profile};
use crate::services::session::{SessionProvider, SessionSnapshot};
use crate::state::AppState;

/// Body of `GET /api/session` and of every sign-in/sign-out response.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    pub admin: bool,
    pub user: Option<CurrentUser>,
    pub profile: Option<Profile>,
}

impl From<SessionSnapshot> for SessionView {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            authenticated: snapshot.is_authenticated(),
            admin: snapshot.is_admin(),
            user: snapshot.user,
            profile: snapshot.profile,
        }
    }
}

/// Current identity and profile.
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<SessionView>> {
    let snapshot = SessionProvider::new(&session, ProfileRepository::new(state.pool()))
        .snapshot()
        .await?;
    Ok(Json(snapshot.into()))
}
