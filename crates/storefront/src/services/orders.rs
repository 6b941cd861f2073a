//! Order history and owner cancellation.

use std::future::Future;

use thiserror::Error;
use tracing::{info, instrument};

use harbor_shop_core::{OrderId, OrderStatus, UserId};

use crate::db::RepositoryError;
use crate::models::Order;

/// Owner-scoped order reads and the cancel write.
pub trait OrderStore {
    fn list_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    fn get_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// Returns `false` if no cancellable order matched.
    fn mark_cancelled(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order not found")]
    NotFound,

    #[error("a {0} order cannot be cancelled")]
    NotCancellable(OrderStatus),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct OrderService<S> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the read fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_for_user(user_id).await?)
    }

    /// Another user's order is reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` unless `user_id` owns the order.
    pub async fn get_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Order, OrderError> {
        self.store
            .get_for_user(order_id, user_id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// Cancel an order the user owns, unless it was delivered or already cancelled.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for a missing or foreign order and
    /// `OrderError::NotCancellable` when the status forbids it, including when
    /// the status changed between the read and the update.
    #[instrument(skip(self), fields(%order_id, %user_id))]
    pub async fn cancel(&self, order_id: OrderId, user_id: UserId) -> Result<Order, OrderError> {
        let mut order = self.get_for_user(order_id, user_id).await?;
        let cancelled = order
            .status
            .cancel()
            .map_err(|e| OrderError::NotCancellable(e.from))?;

        if !self.store.mark_cancelled(order_id, user_id).await? {
            let current = self
                .store
                .get_for_user(order_id, user_id)
                .await?
                .map_or(order.status, |o| o.status);
            return Err(OrderError::NotCancellable(current));
        }

        info!(from = %order.status, "Order cancelled");
        order.status = cancelled;
        Ok(order)
    }
}
