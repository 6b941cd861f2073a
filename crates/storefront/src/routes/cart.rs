//! Cart route handlers.
//!
//! The cart lives in the session; every response carries the full cart with
//! its quote so the client never computes totals itself.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use harbor_shop_core::{Cart, CartLine, OrderQuote, Price, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::cart::CartStore;
use crate::services::catalog::{CatalogError, CatalogService};
use crate::services::notices::Notices;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: Price,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total_items: u64,
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let quote = OrderQuote::for_cart(&cart);
        Self {
            total_items: cart.total_items(),
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineView {
                    line_total: line.line_total(),
                    line: line.clone(),
                })
                .collect(),
            subtotal: quote.subtotal,
            tax: quote.tax,
            total: quote.total,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItem {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetQuantity {
    pub quantity: u32,
}

/// Current cart.
pub async fn show(session: Session) -> Result<Json<CartView>> {
    Ok(Json(CartStore::new(&session).load().await?.into()))
}

/// Add a product. The product must exist and be in stock.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(input): Json<AddItem>,
) -> Result<Json<CartView>> {
    let product_id = ProductId::parse(&input.product_id)?;
    let product = CatalogService::new(ProductRepository::new(state.pool()), state.catalog_cache())
        .get(product_id)
        .await
        .map_err(|e| match e {
            CatalogError::NotFound => AppError::BadRequest("product does not exist".to_string()),
            other => other.into(),
        })?;

    let cart = CartStore::new(&session)
        .add(product.snapshot(), input.quantity)
        .await?;
    Notices::new(&session)
        .success(format!("{} × {} added to cart", input.quantity, product.name))
        .await;
    let product_ref = product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_ref.as_str())]));
    Ok(Json(cart.into()))
}

/// Set a line's quantity; values below one become one.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Path(product_id): Path<String>,
    Json(input): Json<SetQuantity>,
) -> Result<Json<CartView>> {
    let product_id = ProductId::parse(&product_id)?;
    let cart = CartStore::new(&session)
        .update_quantity(product_id, input.quantity)
        .await?;
    Ok(Json(cart.into()))
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(session: Session, Path(product_id): Path<String>) -> Result<Json<CartView>> {
    let product_id = ProductId::parse(&product_id)?;
    Ok(Json(CartStore::new(&session).remove(product_id).await?.into()))
}

/// Empty the cart.
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    Ok(Json(CartStore::new(&session).clear().await?.into()))
}
