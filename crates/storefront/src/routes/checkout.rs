//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use harbor_shop_core::ShippingAddress;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::PlacedOrder;
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// Place an order from the session cart.
///
/// Anonymous visitors get 401 with `redirect: "/login"`.
#[instrument(skip_all)]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(address): Json<ShippingAddress>,
) -> Result<(StatusCode, Json<PlacedOrder>)> {
    let placed = CheckoutService::new(OrderRepository::new(state.pool()), &session)
        .place_order(user.as_ref(), address)
        .await?;
    Ok((StatusCode::CREATED, Json(placed)))
}
