//! Product catalog route handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use harbor_shop_core::ProductId;

use crate::db::{ProductFilter, ProductRepository};
use crate::error::Result;
use crate::models::Product;
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub related: Vec<Product>,
}

fn catalog(state: &AppState) -> CatalogService<'_> {
    CatalogService::new(ProductRepository::new(state.pool()), state.catalog_cache())
}

/// Product listing, optionally filtered by category and search text.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Arc<Vec<Product>>>> {
    let filter = ProductFilter::new(query.category.as_deref(), query.q.as_deref());
    Ok(Json(catalog(&state).list(&filter).await?))
}

/// Distinct category labels.
pub async fn categories(State(state): State<AppState>) -> Result<Json<Arc<Vec<String>>>> {
    Ok(Json(catalog(&state).categories().await?))
}

/// Product detail with related products from the same category.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>> {
    let id = ProductId::parse(&id)?;
    let catalog = catalog(&state);
    let product = catalog.get(id).await?;
    let related = catalog.related(&product).await?;
    Ok(Json(ProductDetail { product, related }))
}
