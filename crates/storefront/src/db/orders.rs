//! Order repository.
//!
//! Placing an order writes the header and every line inside one transaction,
//! so a failed line insert never leaves an order without its items.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use harbor_shop_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{NewOrder, Order, OrderItem};
use crate::services::checkout::OrderWriter;
use crate::services::orders::OrderStore;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    total_amount: Decimal,
    shipping_address: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            total_amount: Price::usd(self.total_amount),
            shipping_address: self.shipping_address,
            status: self.status,
            created_at: self.created_at,
            items,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    quantity: i32,
    price: Decimal,
    product_name: Option<String>,
    image_url: Option<String>,
    category: Option<String>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order item {} has quantity {}",
                row.id, row.quantity
            ))
        })?;
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            quantity,
            price: Price::usd(row.price),
            product_name: row.product_name,
            image_url: row.image_url,
            category: row.category,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, total_amount, shipping_address, status, created_at";

/// Repository for order database operations.
#[derive(Clone, Copy)]
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order header and all of its lines atomically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// written in that case.
    pub async fn place(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let header = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (id, user_id, total_amount, shipping_address, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(new_order.id)
        .bind(new_order.user_id)
        .bind(new_order.total_amount.round_to_cents().amount)
        .bind(&new_order.shipping_address)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(new_order.items.len());
        for line in new_order.items {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} out of range", line.quantity))
            })?;
            let item_id = OrderItemId::generate();
            sqlx::query(
                r"
                INSERT INTO order_items (id, order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(item_id)
            .bind(header.id)
            .bind(line.product_id)
            .bind(quantity)
            .bind(line.unit_price.amount)
            .execute(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: item_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.unit_price,
                product_name: Some(line.product_name),
                image_url: line.image_url,
                category: Some(line.category),
            });
        }

        tx.commit().await?;

        Ok(header.into_order(items))
    }

    async fn items_for(
        &self,
        order_ids: &[Uuid],
    ) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.price,
                   p.name AS product_name, p.image_url, p.category
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id
            ",
        )
        .bind(order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let order_id = row.order_id;
            by_order
                .entry(order_id)
                .or_default()
                .push(OrderItem::try_from(row)?);
        }
        Ok(by_order)
    }

    /// A user's orders with their lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let headers = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id.as_uuid()).collect();
        let mut items = self.items_for(&ids).await?;

        Ok(headers
            .into_iter()
            .map(|h| {
                let lines = items.remove(&h.id).unwrap_or_default();
                h.into_order(lines)
            })
            .collect())
    }

    /// One order, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let header = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND user_id = $2"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let mut items = self.items_for(&[header.id.as_uuid()]).await?;
        let lines = items.remove(&header.id).unwrap_or_default();
        Ok(Some(header.into_order(lines)))
    }

    /// Set an owned, non-terminal order to cancelled.
    ///
    /// Returns `false` when no row matched (wrong owner, or the order reached a
    /// terminal status first).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_cancelled(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET status = 'cancelled'
            WHERE id = $1 AND user_id = $2
              AND status NOT IN ('delivered', 'cancelled')
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

impl OrderWriter for OrderRepository<'_> {
    async fn place_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        self.place(order).await
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        Self::list_for_user(self, user_id).await
    }

    async fn get_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        Self::get_for_user(self, order_id, user_id).await
    }

    async fn mark_cancelled(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        Self::mark_cancelled(self, order_id, user_id).await
    }
}
