//! Product management for admins.
//!
//! Reads bypass the catalog cache so admins always see the stored rows. Each
//! confirmed write clears the cache and queues a notice; a failed write queues
//! an error notice and leaves the cache alone.

use thiserror::Error;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use harbor_shop_core::{ProductId, ProductInput, ValidationErrors};

use crate::db::{ProductFilter, ProductRepository, RepositoryError};
use crate::models::Product;
use crate::services::catalog::CatalogCache;
use crate::services::notices::Notices;

#[derive(Debug, Error)]
pub enum AdminCatalogError {
    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("product not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AdminCatalogError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Repository(other),
        }
    }
}

impl AdminCatalogError {
    /// Text shown to the admin after the failure prefix.
    fn reason(&self) -> String {
        match self {
            Self::Repository(_) => "database error".to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Create,
    Update,
    Delete,
    UpdateStatus,
}

impl Action {
    const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::UpdateStatus => "set_stock",
        }
    }

    const fn failure_prefix(self) -> &'static str {
        match self {
            Self::Create => "Failed to create product",
            Self::Update => "Failed to update product",
            Self::Delete => "Failed to delete product",
            Self::UpdateStatus => "Failed to update product status",
        }
    }

    const fn success_message(self) -> &'static str {
        match self {
            Self::Create => "Product created successfully",
            Self::Update => "Product updated successfully",
            Self::Delete => "Product deleted successfully",
            Self::UpdateStatus => "Product status updated",
        }
    }
}

fn failure_message(action: Action, error: &AdminCatalogError) -> String {
    format!("{}: {}", action.failure_prefix(), error.reason())
}

pub struct AdminCatalogService<'a> {
    products: ProductRepository<'a>,
    cache: &'a CatalogCache,
    notices: Notices<'a>,
}

impl<'a> AdminCatalogService<'a> {
    #[must_use]
    pub const fn new(
        products: ProductRepository<'a>,
        cache: &'a CatalogCache,
        session: &'a Session,
    ) -> Self {
        Self {
            products,
            cache,
            notices: Notices::new(session),
        }
    }

    /// Every product, in stock or not, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AdminCatalogError::Repository` if the query fails.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Product>, AdminCatalogError> {
        Ok(self.products.list(&ProductFilter::new(None, search)).await?)
    }

    /// # Errors
    ///
    /// Returns `AdminCatalogError::Validation` for bad input.
    #[instrument(skip_all)]
    pub async fn create(&self, input: ProductInput) -> Result<Product, AdminCatalogError> {
        let result = match input.validate() {
            Ok(draft) => self.products.create(&draft).await.map_err(Into::into),
            Err(errors) => Err(AdminCatalogError::Validation(errors)),
        };
        self.finish(Action::Create, result).await
    }

    /// Replace every editable field.
    ///
    /// # Errors
    ///
    /// Returns `AdminCatalogError::Validation` for bad input and `NotFound` for
    /// an unknown id.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, AdminCatalogError> {
        let result = match input.validate() {
            Ok(draft) => self.products.update(id, &draft).await.map_err(Into::into),
            Err(errors) => Err(AdminCatalogError::Validation(errors)),
        };
        self.finish(Action::Update, result).await
    }

    /// # Errors
    ///
    /// Returns `AdminCatalogError::NotFound` for an unknown id and `Conflict`
    /// when orders still reference the product.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<(), AdminCatalogError> {
        let result = self.products.delete(id).await.map_err(Into::into);
        self.finish(Action::Delete, result).await
    }

    /// # Errors
    ///
    /// Returns `AdminCatalogError::NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn set_stock(
        &self,
        id: ProductId,
        in_stock: bool,
    ) -> Result<Product, AdminCatalogError> {
        let result = self.products.set_stock(id, in_stock).await.map_err(Into::into);
        self.finish(Action::UpdateStatus, result).await
    }

    async fn finish<T>(
        &self,
        action: Action,
        result: Result<T, AdminCatalogError>,
    ) -> Result<T, AdminCatalogError> {
        match &result {
            Ok(_) => {
                self.cache.invalidate_all().await;
                self.notices.success(action.success_message()).await;
                info!(action = action.name(), "Catalog updated");
            }
            Err(e) => {
                warn!(action = action.name(), error = %e, "Catalog write failed");
                self.notices.error(failure_message(action, e)).await;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_messages() {
        let errors = ValidationErrors::single("price", "Price is required");
        assert_eq!(
            failure_message(Action::Create, &AdminCatalogError::Validation(errors)),
            "Failed to create product: Price is required"
        );
        assert_eq!(
            failure_message(
                Action::Delete,
                &AdminCatalogError::Conflict("product is referenced by existing orders".into())
            ),
            "Failed to delete product: product is referenced by existing orders"
        );
        assert_eq!(
            failure_message(
                Action::UpdateStatus,
                &AdminCatalogError::Repository(RepositoryError::DataCorruption("x".into()))
            ),
            "Failed to update product status: database error"
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            AdminCatalogError::from(RepositoryError::NotFound),
            AdminCatalogError::NotFound
        ));
        assert!(matches!(
            AdminCatalogError::from(RepositoryError::Conflict("in use".into())),
            AdminCatalogError::Conflict(m) if m == "in use"
        ));
    }
}
