//! Session and profile provider.
//!
//! The signed-in identity and its profile live in the server session. A
//! [`SessionProvider`] is built per request around the request's [`Session`]
//! and reacts to sign-in, sign-out and profile edits through [`SessionEvent`].

use std::future::Future;

use serde::Serialize;
use thiserror::Error;
use tower_sessions::Session;
use tracing::{instrument, warn};

use harbor_shop_core::UserId;

use crate::db::RepositoryError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, Profile, session_keys};

/// Fetches a profile for a signed-in user.
pub trait ProfileLookup {
    fn find_profile(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Profile>, RepositoryError>> + Send;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Store(#[from] tower_sessions::session::Error),
}

/// What the current request knows about the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<CurrentUser>,
    pub profile: Option<Profile>,
}

impl SessionSnapshot {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Admin only when a profile was loaded and carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.is_some() && self.profile.as_ref().is_some_and(Profile::is_admin)
    }
}

/// A change to the session's identity.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(CurrentUser),
    ProfileChanged,
    SignedOut,
}

pub struct SessionProvider<'a, P> {
    session: &'a Session,
    profiles: P,
}

impl<'a, P: ProfileLookup> SessionProvider<'a, P> {
    #[must_use]
    pub const fn new(session: &'a Session, profiles: P) -> Self {
        Self { session, profiles }
    }

    /// The signed-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` if the session cannot be read.
    pub async fn current_user(&self) -> Result<Option<CurrentUser>, SessionError> {
        Ok(self.session.get(session_keys::CURRENT_USER).await?)
    }

    /// Read the identity and profile stored in the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` if the session cannot be read.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let Some(user) = self.current_user().await? else {
            return Ok(SessionSnapshot::default());
        };
        let profile = self.session.get(session_keys::PROFILE).await?;
        Ok(SessionSnapshot {
            user: Some(user),
            profile,
        })
    }

    /// React to an identity change and return the resulting snapshot.
    ///
    /// Sign-in and sign-out both issue a new session id. The cart is kept
    /// across either.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` if the session cannot be written. A failed
    /// profile fetch is not an error; the profile is left empty.
    #[instrument(skip(self, event), fields(event = event_name(&event)))]
    pub async fn apply(&self, event: SessionEvent) -> Result<SessionSnapshot, SessionError> {
        match event {
            SessionEvent::SignedIn(user) => {
                self.session.cycle_id().await?;
                self.session
                    .insert(session_keys::CURRENT_USER, &user)
                    .await?;
                set_sentry_user(&user.id, Some(user.email.as_str()));
                let profile = self.refresh_profile(user.id).await?;
                Ok(SessionSnapshot {
                    user: Some(user),
                    profile,
                })
            }
            SessionEvent::ProfileChanged => {
                let Some(user) = self.current_user().await? else {
                    return Ok(SessionSnapshot::default());
                };
                let profile = self.refresh_profile(user.id).await?;
                Ok(SessionSnapshot {
                    user: Some(user),
                    profile,
                })
            }
            SessionEvent::SignedOut => {
                self.session
                    .remove_value(session_keys::CURRENT_USER)
                    .await?;
                self.session.remove_value(session_keys::PROFILE).await?;
                self.session.cycle_id().await?;
                clear_sentry_user();
                Ok(SessionSnapshot::default())
            }
        }
    }

    async fn refresh_profile(&self, user_id: UserId) -> Result<Option<Profile>, SessionError> {
        let profile = match self.profiles.find_profile(user_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                warn!(%user_id, "No profile row for signed-in user");
                None
            }
            Err(e) => {
                warn!(%user_id, error = %e, "Failed to load profile");
                None
            }
        };

        match &profile {
            Some(p) => self.session.insert(session_keys::PROFILE, p).await?,
            None => {
                self.session.remove_value(session_keys::PROFILE).await?;
            }
        }
        Ok(profile)
    }
}

const fn event_name(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::SignedIn(_) => "signed_in",
        SessionEvent::ProfileChanged => "profile_changed",
        SessionEvent::SignedOut => "signed_out",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;

    use harbor_shop_core::{Email, Role};
    use tower_sessions::MemoryStore;

    use super::*;

    pub(crate) fn memory_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    /// Returns a fixed profile, or fails every lookup.
    pub(crate) struct FixedProfile(pub Option<Role>);

    impl ProfileLookup for FixedProfile {
        async fn find_profile(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
            match self.0 {
                Some(role) => Ok(Some(Profile {
                    id: user_id,
                    full_name: Some("Ada Lovelace".to_string()),
                    avatar_url: None,
                    role,
                })),
                None => Err(RepositoryError::DataCorruption("lookup failed".to_string())),
            }
        }
    }

    pub(crate) fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            email: Email::parse("ada@example.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_anonymous_snapshot() {
        let session = memory_session();
        let provider = SessionProvider::new(&session, FixedProfile(Some(Role::Admin)));
        let snapshot = provider.snapshot().await.unwrap();
        assert!(!snapshot.is_authenticated());
        assert!(!snapshot.is_admin());
    }

    #[tokio::test]
    async fn test_sign_in_loads_profile() {
        let session = memory_session();
        let provider = SessionProvider::new(&session, FixedProfile(Some(Role::Admin)));
        let user = user();

        let snapshot = provider
            .apply(SessionEvent::SignedIn(user.clone()))
            .await
            .unwrap();
        assert!(snapshot.is_admin());
        assert_eq!(provider.snapshot().await.unwrap(), snapshot);
        assert_eq!(snapshot.user, Some(user));
    }

    #[tokio::test]
    async fn test_profile_failure_is_not_admin() {
        let session = memory_session();
        let provider = SessionProvider::new(&session, FixedProfile(None));

        let snapshot = provider.apply(SessionEvent::SignedIn(user())).await.unwrap();
        assert!(snapshot.is_authenticated());
        assert!(snapshot.profile.is_none());
        assert!(!snapshot.is_admin());
    }

    #[tokio::test]
    async fn test_sign_out_keeps_cart() {
        let session = memory_session();
        session
            .insert(session_keys::CART, harbor_shop_core::Cart::new())
            .await
            .unwrap();
        let provider = SessionProvider::new(&session, FixedProfile(Some(Role::Customer)));
        provider.apply(SessionEvent::SignedIn(user())).await.unwrap();

        let snapshot = provider.apply(SessionEvent::SignedOut).await.unwrap();
        assert_eq!(snapshot, SessionSnapshot::default());
        assert_eq!(provider.snapshot().await.unwrap(), SessionSnapshot::default());
        assert!(
            session
                .get::<harbor_shop_core::Cart>(session_keys::CART)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_profile_changed_without_user() {
        let session = memory_session();
        let provider = SessionProvider::new(&session, FixedProfile(Some(Role::Admin)));
        let snapshot = provider.apply(SessionEvent::ProfileChanged).await.unwrap();
        assert!(!snapshot.is_authenticated());
    }
}
