//! Checkout: turn the session cart into a placed order.
//!
//! Placement runs guard, quote, submit, finalize. The submit step hands a
//! complete [`NewOrder`] to an [`OrderWriter`], which must insert the header
//! and every line atomically. The cart is only cleared after the write
//! succeeds.

use std::future::Future;

use thiserror::Error;
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use harbor_shop_core::{MAX_ORDER_TOTAL, OrderQuote, Price, ShippingAddress, ValidationErrors};

use crate::db::RepositoryError;
use crate::models::{CurrentUser, NewOrder, Order, PlacedOrder};
use crate::services::cart::{CartStore, CartStoreError};
use crate::services::notices::Notices;

/// Persists an order with all of its lines in one unit of work.
pub trait OrderWriter {
    fn place_order(
        &self,
        order: NewOrder,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign in to place an order")]
    Unauthenticated,

    #[error("your cart is empty")]
    EmptyCart,

    #[error("invalid shipping address: {0}")]
    Validation(ValidationErrors),

    #[error("order total {total} exceeds the limit of {}", Price::usd(MAX_ORDER_TOTAL))]
    TotalTooLarge { total: Price },

    #[error("failed to place order: {0}")]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Cart(#[from] CartStoreError),
}

pub struct CheckoutService<'a, W> {
    writer: W,
    cart: CartStore<'a>,
    notices: Notices<'a>,
}

impl<'a, W: OrderWriter> CheckoutService<'a, W> {
    #[must_use]
    pub const fn new(writer: W, session: &'a Session) -> Self {
        Self {
            writer,
            cart: CartStore::new(session),
            notices: Notices::new(session),
        }
    }

    /// Place an order for the signed-in user from the session cart.
    ///
    /// Unit prices are captured from the cart lines. On failure the cart is
    /// left as it was.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without an identity, `EmptyCart` for an empty
    /// cart, `Validation` for a bad address, `TotalTooLarge` when the total
    /// cannot be stored and `Repository` if the write fails.
    #[instrument(skip_all, fields(user_id))]
    pub async fn place_order(
        &self,
        identity: Option<&CurrentUser>,
        address: ShippingAddress,
    ) -> Result<PlacedOrder, CheckoutError> {
        let Some(user) = identity else {
            return Err(CheckoutError::Unauthenticated);
        };
        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        let cart = self.cart.load().await?;
        if cart.is_empty() {
            self.notices.error("Your cart is empty").await;
            return Err(CheckoutError::EmptyCart);
        }
        address.validate().map_err(CheckoutError::Validation)?;

        let quote = OrderQuote::for_cart(&cart);
        if quote.exceeds_order_limit() {
            warn!(total = %quote.total, "Order total over limit");
            self.notices.error("Order total is too large").await;
            return Err(CheckoutError::TotalTooLarge { total: quote.total });
        }
        let new_order = NewOrder::from_cart(user.id, &cart, &quote, &address);

        let order = match self.writer.place_order(new_order).await {
            Ok(order) => order,
            Err(e) => {
                error!(error = %e, "Order placement failed");
                self.notices.error("Failed to place order").await;
                return Err(e.into());
            }
        };

        if let Err(e) = self.cart.clear().await {
            warn!(order_id = %order.id, error = %e, "Order placed but cart not cleared");
        }
        self.notices.success("Your order has been placed").await;
        info!(order_id = %order.id, total = %order.total_amount, "Order placed");

        Ok(PlacedOrder::new(order))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;
    use std::sync::Mutex;

    use chrono::Utc;
    use harbor_shop_core::{OrderItemId, OrderStatus, Price, ProductId, ProductSnapshot};
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::OrderItem;
    use crate::services::notices::NoticeLevel;
    use crate::services::session::tests::{memory_session, user};

    /// Records submitted orders, or fails every write.
    #[derive(Default)]
    struct RecordingWriter {
        fail: bool,
        placed: Mutex<Vec<NewOrder>>,
    }

    impl OrderWriter for &RecordingWriter {
        async fn place_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::DataCorruption("insert failed".to_string()));
            }
            self.placed.lock().unwrap().push(order.clone());
            Ok(Order {
                id: order.id,
                user_id: order.user_id,
                total_amount: order.total_amount,
                shipping_address: order.shipping_address,
                status: OrderStatus::Pending,
                created_at: Utc::now(),
                items: order
                    .items
                    .into_iter()
                    .map(|i| OrderItem {
                        id: OrderItemId::generate(),
                        product_id: i.product_id,
                        quantity: i.quantity,
                        price: i.unit_price,
                        product_name: Some(i.product_name),
                        image_url: i.image_url,
                        category: Some(i.category),
                    })
                    .collect(),
            })
        }
    }

    fn address() -> ShippingAddress {
        ShippingAddress {
            street: "1 Pier Rd".to_string(),
            city: "Portland".to_string(),
            state: "ME".to_string(),
            zip: "04101".to_string(),
        }
    }

    fn product(price: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::generate(),
            name: "Lamp".to_string(),
            description: String::new(),
            price: Price::usd(Decimal::from_str(price).unwrap()),
            image_url: None,
            category: "Home".to_string(),
            in_stock: true,
        }
    }

    async fn fill_cart(session: &Session) {
        let store = CartStore::new(session);
        store.add(product("10.00"), 2).await.unwrap();
        store.add(product("5.00"), 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_places_order_and_clears_cart() {
        let session = memory_session();
        fill_cart(&session).await;
        let writer = RecordingWriter::default();
        let user = user();

        let placed = CheckoutService::new(&writer, &session)
            .place_order(Some(&user), address())
            .await
            .unwrap();

        assert_eq!(placed.order.total_amount.amount, Decimal::from_str("27.00").unwrap());
        let recorded = writer.placed.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].total_amount.amount, Decimal::from_str("27.00").unwrap());
        let lines: Vec<(u32, Decimal)> = recorded[0]
            .items
            .iter()
            .map(|i| (i.quantity, i.unit_price.amount))
            .collect();
        assert_eq!(
            lines,
            [
                (2, Decimal::from_str("10.00").unwrap()),
                (1, Decimal::from_str("5.00").unwrap()),
            ]
        );
        drop(recorded);
        assert_eq!(
            placed.confirmation_path,
            format!("/order-confirmation?order_id={}", placed.order.id)
        );
        assert!(CartStore::new(&session).load().await.unwrap().is_empty());

        let notices = Notices::new(&session).drain().await.unwrap();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_requires_identity() {
        let session = memory_session();
        fill_cart(&session).await;
        let writer = RecordingWriter::default();

        let err = CheckoutService::new(&writer, &session)
            .place_order(None, address())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Unauthenticated));
        assert!(writer.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let session = memory_session();
        let writer = RecordingWriter::default();
        let err = CheckoutService::new(&writer, &session)
            .place_order(Some(&user()), address())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(writer.placed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_address_rejected() {
        let session = memory_session();
        fill_cart(&session).await;
        let writer = RecordingWriter::default();
        let err = CheckoutService::new(&writer, &session)
            .place_order(Some(&user()), ShippingAddress::default())
            .await
            .unwrap_err();
        let CheckoutError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("zip"), Some("ZIP code is required"));
    }

    #[tokio::test]
    async fn test_total_over_limit_keeps_cart() {
        let session = memory_session();
        let store = CartStore::new(&session);
        store.add(product("99999999.99"), 93).await.unwrap();
        let writer = RecordingWriter::default();

        let err = CheckoutService::new(&writer, &session)
            .place_order(Some(&user()), address())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::TotalTooLarge { .. }));
        assert!(writer.placed.lock().unwrap().is_empty());
        assert_eq!(store.load().await.unwrap().total_items(), 93);

        let notices = Notices::new(&session).drain().await.unwrap();
        assert_eq!(notices[0].message, "Order total is too large");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cart() {
        let session = memory_session();
        fill_cart(&session).await;
        let writer = RecordingWriter {
            fail: true,
            ..RecordingWriter::default()
        };

        let err = CheckoutService::new(&writer, &session)
            .place_order(Some(&user()), address())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Repository(_)));
        assert_eq!(CartStore::new(&session).load().await.unwrap().total_items(), 3);

        let notices = Notices::new(&session).drain().await.unwrap();
        assert_eq!(notices[0].message, "Failed to place order");
    }
}
