//! Admin role management commands.
//!
//! Accounts are created through registration; these commands only change the
//! role on an existing profile.
//!
//! # Usage
//!
//! ```bash
//! hs-cli admin promote -e owner@example.com
//! hs-cli admin demote -e former@example.com
//! ```

use harbor_shop_core::{Email, Role};
use harbor_shop_storefront::db::{self, ProfileRepository, RepositoryError};
use thiserror::Error;

use super::database_url;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No account is registered with the email.
    #[error("No account found with email: {0}")]
    UnknownAccount(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// Set the role on the account registered with `email`.
///
/// # Errors
///
/// Returns `AdminError::UnknownAccount` if nobody registered with that email.
pub async fn set_role(email: &str, role: Role) -> Result<(), AdminError> {
    let parsed = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;

    let database_url = database_url().ok_or(AdminError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    let profile = ProfileRepository::new(&pool)
        .set_role_by_email(&parsed, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UnknownAccount(email.to_owned()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Role updated! ID: {}, Email: {}, Role: {}",
        profile.id,
        parsed,
        profile.role
    );
    Ok(())
}
