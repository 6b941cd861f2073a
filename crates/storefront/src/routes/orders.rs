//! Order history, detail and cancellation.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use harbor_shop_core::OrderId;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderBreakdown};
use crate::services::notices::Notices;
use crate::services::orders::{OrderError, OrderService};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub breakdown: OrderBreakdown,
    pub item_count: u64,
    pub status_message: &'static str,
    pub can_cancel: bool,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            breakdown: order.breakdown(),
            item_count: order.item_count(),
            status_message: order.status.customer_message(),
            can_cancel: order.status.can_cancel(),
            order,
        }
    }
}

fn orders(state: &AppState) -> OrderService<OrderRepository<'_>> {
    OrderService::new(OrderRepository::new(state.pool()))
}

/// The signed-in user's orders, newest first.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderView>>> {
    let orders = orders(&state).list_for_user(user.id).await?;
    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// One of the signed-in user's orders.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<OrderView>> {
    let order_id = OrderId::parse(&id)?;
    let order = orders(&state).get_for_user(order_id, user.id).await?;
    Ok(Json(order.into()))
}

/// Cancel an order that has not been delivered.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn cancel(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<OrderView>> {
    let order_id = OrderId::parse(&id)?;
    let notices = Notices::new(&session);
    match orders(&state).cancel(order_id, user.id).await {
        Ok(order) => {
            notices.success("Order cancelled successfully").await;
            Ok(Json(order.into()))
        }
        Err(e) => {
            if !matches!(e, OrderError::NotFound) {
                notices.error("Failed to cancel order").await;
            }
            Err(e.into())
        }
    }
}
