//! Admin product management.
//!
//! Every handler takes [`RequireAdmin`], which re-checks the role against the
//! database.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use harbor_shop_core::{ProductId, ProductInput};

use crate::db::ProductRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::services::admin_catalog::AdminCatalogService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockUpdate {
    pub in_stock: bool,
}

fn admin_catalog<'a>(state: &'a AppState, session: &'a Session) -> AdminCatalogService<'a> {
    AdminCatalogService::new(
        ProductRepository::new(state.pool()),
        state.catalog_cache(),
        session,
    )
}

/// All products, including out of stock.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    _admin: RequireAdmin,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = admin_catalog(&state, &session)
        .list(query.q.as_deref())
        .await?;
    Ok(Json(products))
}

#[instrument(skip_all, fields(admin_id = %admin.user.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    admin: RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = admin_catalog(&state, &session).create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip_all, fields(admin_id = %admin.user.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    admin: RequireAdmin,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let id = ProductId::parse(&id)?;
    Ok(Json(admin_catalog(&state, &session).update(id, input).await?))
}

#[instrument(skip_all, fields(admin_id = %admin.user.id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = ProductId::parse(&id)?;
    admin_catalog(&state, &session).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Toggle availability.
#[instrument(skip_all, fields(admin_id = %admin.user.id))]
pub async fn set_stock(
    State(state): State<AppState>,
    session: Session,
    admin: RequireAdmin,
    Path(id): Path<String>,
    Json(input): Json<StockUpdate>,
) -> Result<Json<Product>> {
    let id = ProductId::parse(&id)?;
    Ok(Json(
        admin_catalog(&state, &session)
            .set_stock(id, input.in_stock)
            .await?,
    ))
}
