//! Profile repository.

use sqlx::PgPool;

use harbor_shop_core::validation::ProfileChanges;
use harbor_shop_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::Profile;
use crate::services::session::ProfileLookup;

/// Repository for profile database operations.
#[derive(Clone, Copy)]
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the profile for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let profile = sqlx::query_as::<_, Profile>(
            r"
            SELECT id, full_name, avatar_url, role
            FROM profiles
            WHERE id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// Update the editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile.
    pub async fn update(
        &self,
        user_id: UserId,
        changes: &ProfileChanges,
    ) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>(
            r"
            UPDATE profiles
            SET full_name = $2, avatar_url = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, full_name, avatar_url, role
            ",
        )
        .bind(user_id)
        .bind(changes.full_name.as_deref())
        .bind(changes.avatar_url.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Set the role for the account with the given email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has that email.
    pub async fn set_role_by_email(
        &self,
        email: &Email,
        role: Role,
    ) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>(
            r"
            UPDATE profiles p
            SET role = $2, updated_at = NOW()
            FROM users u
            WHERE u.id = p.id AND u.email = $1
            RETURNING p.id, p.full_name, p.avatar_url, p.role
            ",
        )
        .bind(email)
        .bind(role)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

impl ProfileLookup for ProfileRepository<'_> {
    async fn find_profile(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        self.get(user_id).await
    }
}
