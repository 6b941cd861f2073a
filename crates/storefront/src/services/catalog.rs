//! Catalog reads with a short-lived cache.
//!
//! Listings, single products and the category list are cached with `moka`.
//! Admin writes call [`CatalogCache::invalidate_all`] once the database has
//! confirmed the change.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use harbor_shop_core::ProductId;

use crate::db::{ProductFilter, ProductRepository, RepositoryError};
use crate::models::Product;

/// Number of related products shown on a detail page.
pub const RELATED_LIMIT: i64 = 4;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products(ProductFilter),
    Product(ProductId),
    Categories,
}

#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    Categories(Arc<Vec<String>>),
}

/// Shared catalog cache. Cheap to clone.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Cache<CacheKey, CacheValue>,
}

impl CatalogCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(1000).time_to_live(ttl).build(),
        }
    }

    /// Drop every cached entry.
    pub async fn invalidate_all(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    async fn products(&self, filter: &ProductFilter) -> Option<Arc<Vec<Product>>> {
        match self.inner.get(&CacheKey::Products(filter.clone())).await {
            Some(CacheValue::Products(products)) => Some(products),
            _ => None,
        }
    }

    async fn product(&self, id: ProductId) -> Option<Product> {
        match self.inner.get(&CacheKey::Product(id)).await {
            Some(CacheValue::Product(product)) => Some(*product),
            _ => None,
        }
    }

    async fn categories(&self) -> Option<Arc<Vec<String>>> {
        match self.inner.get(&CacheKey::Categories).await {
            Some(CacheValue::Categories(categories)) => Some(categories),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    cache: &'a CatalogCache,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(products: ProductRepository<'a>, cache: &'a CatalogCache) -> Self {
        Self { products, cache }
    }

    /// Products matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ProductFilter) -> Result<Arc<Vec<Product>>, CatalogError> {
        if let Some(products) = self.cache.products(filter).await {
            debug!("Cache hit for product listing");
            return Ok(products);
        }
        let products = Arc::new(self.products.list(filter).await?);
        self.cache
            .inner
            .insert(
                CacheKey::Products(filter.clone()),
                CacheValue::Products(Arc::clone(&products)),
            )
            .await;
        Ok(products)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has this id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        if let Some(product) = self.cache.product(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }
        let product = self.products.get(id).await?.ok_or(CatalogError::NotFound)?;
        self.cache
            .inner
            .insert(
                CacheKey::Product(id),
                CacheValue::Product(Box::new(product.clone())),
            )
            .await;
        Ok(product)
    }

    /// Up to [`RELATED_LIMIT`] other products from the same category.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn related(&self, product: &Product) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .products
            .related(&product.category, product.id, RELATED_LIMIT)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn categories(&self) -> Result<Arc<Vec<String>>, CatalogError> {
        if let Some(categories) = self.cache.categories().await {
            return Ok(categories);
        }
        let categories = Arc::new(self.products.categories().await?);
        self.cache
            .inner
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }
}
