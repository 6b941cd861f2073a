//! Flash notice delivery.

use axum::Json;
use tower_sessions::Session;

use crate::error::Result;
use crate::services::notices::{Notice, Notices};

/// Return and clear queued notices.
pub async fn drain(session: Session) -> Result<Json<Vec<Notice>>> {
    Ok(Json(Notices::new(&session).drain().await?))
}
