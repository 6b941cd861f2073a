//! Flash notices shown to the visitor as toasts.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::warn;

use crate::models::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Queue of notices kept in the session until the client drains them.
#[derive(Clone, Copy)]
pub struct Notices<'a> {
    session: &'a Session,
}

impl<'a> Notices<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Queue a notice. A session write failure is logged and dropped.
    pub async fn push(&self, level: NoticeLevel, message: impl Into<String>) {
        let mut queue = match self.session.get::<Vec<Notice>>(session_keys::NOTICES).await {
            Ok(queue) => queue.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable notice queue");
                Vec::new()
            }
        };
        queue.push(Notice {
            level,
            message: message.into(),
        });
        if let Err(e) = self.session.insert(session_keys::NOTICES, queue).await {
            warn!(error = %e, "Failed to queue notice");
        }
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message).await;
    }

    pub async fn info(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message).await;
    }

    /// Take every queued notice, oldest first, and empty the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn drain(&self) -> Result<Vec<Notice>, tower_sessions::session::Error> {
        let Some(value) = self.session.remove_value(session_keys::NOTICES).await? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "Dropping unreadable notice queue");
            Vec::new()
        }))
    }
}
