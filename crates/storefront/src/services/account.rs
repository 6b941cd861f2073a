//! Profile edits for the signed-in user.

use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use harbor_shop_core::validation::ProfileUpdate;
use harbor_shop_core::{UserId, ValidationErrors};

use crate::db::{ProfileRepository, RepositoryError};
use crate::services::notices::Notices;
use crate::services::session::{SessionError, SessionEvent, SessionProvider, SessionSnapshot};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct AccountService<'a> {
    profiles: ProfileRepository<'a>,
    session: &'a Session,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(profiles: ProfileRepository<'a>, session: &'a Session) -> Self {
        Self { profiles, session }
    }

    /// Store the new name and avatar, then refresh the session's profile.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Validation` for bad input and
    /// `AccountError::Repository` if the profile row is missing or the write fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<SessionSnapshot, AccountError> {
        let changes = update.validate().map_err(AccountError::Validation)?;
        self.profiles.update(user_id, &changes).await?;

        let snapshot = SessionProvider::new(self.session, self.profiles)
            .apply(SessionEvent::ProfileChanged)
            .await?;
        Notices::new(self.session)
            .success("Profile updated successfully")
            .await;
        Ok(snapshot)
    }
}
