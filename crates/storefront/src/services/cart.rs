//! Session-backed cart store.
//!
//! The cart belongs to the browser session, not the account, so it survives
//! sign-in and sign-out. Every mutation loads, changes and writes back the
//! whole cart; concurrent requests from one session resolve as last write wins.

use thiserror::Error;
use tower_sessions::Session;
use tracing::{debug, warn};

use harbor_shop_core::{Cart, CartError, ProductId, ProductSnapshot};

use crate::models::session_keys;

#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

#[derive(Clone, Copy)]
pub struct CartStore<'a> {
    session: &'a Session,
}

impl<'a> CartStore<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// The persisted cart. Missing means empty; an unreadable cart is reset.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError::Session` if the session store fails.
    pub async fn load(&self) -> Result<Cart, CartStoreError> {
        match self.session.get::<Cart>(session_keys::CART).await {
            Ok(cart) => Ok(cart.unwrap_or_default()),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                warn!(error = %e, "Resetting unreadable cart");
                self.session.remove_value(session_keys::CART).await?;
                Ok(Cart::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CartStoreError::Cart` when the cart rejects the line and
    /// `CartStoreError::Session` if the session store fails.
    pub async fn add(
        &self,
        product: ProductSnapshot,
        quantity: u32,
    ) -> Result<Cart, CartStoreError> {
        let mut cart = self.load().await?;
        cart.add(product, quantity)?;
        self.save(&cart).await?;
        Ok(cart)
    }

    /// Set a line's quantity, clamped to at least one.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError::Session` if the session store fails.
    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, CartStoreError> {
        let mut cart = self.load().await?;
        if cart.update_quantity(product_id, quantity) {
            self.save(&cart).await?;
        } else {
            debug!(%product_id, "Quantity update for product not in cart");
        }
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns `CartStoreError::Session` if the session store fails.
    pub async fn remove(&self, product_id: ProductId) -> Result<Cart, CartStoreError> {
        let mut cart = self.load().await?;
        if cart.remove(product_id) {
            self.save(&cart).await?;
        }
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns `CartStoreError::Session` if the session store fails.
    pub async fn clear(&self) -> Result<Cart, CartStoreError> {
        let cart = Cart::new();
        self.save(&cart).await?;
        Ok(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use harbor_shop_core::Price;
    use rust_decimal::Decimal;

    use super::*;
    use crate::services::session::tests::memory_session;

    fn snapshot(name: &str, price: &str, in_stock: bool) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::generate(),
            name: name.to_string(),
            description: String::new(),
            price: Price::usd(Decimal::from_str(price).unwrap()),
            image_url: None,
            category: "Home".to_string(),
            in_stock,
        }
    }

    #[tokio::test]
    async fn test_mutations_persist() {
        let session = memory_session();
        let store = CartStore::new(&session);
        let kettle = snapshot("Kettle", "30.00", true);
        let mug = snapshot("Mug", "8.50", true);

        store.add(kettle.clone(), 1).await.unwrap();
        store.add(mug.clone(), 2).await.unwrap();
        store.update_quantity(kettle.id, 0).await.unwrap();
        store.remove(mug.id).await.unwrap();

        let reloaded = CartStore::new(&session).load().await.unwrap();
        assert_eq!(reloaded.lines().len(), 1);
        assert_eq!(reloaded.line(kettle.id).unwrap().quantity, 1);
        assert_eq!(reloaded.total_price().to_string(), "$30.00");
    }

    #[tokio::test]
    async fn test_out_of_stock_not_saved() {
        let session = memory_session();
        let store = CartStore::new(&session);
        let err = store
            .add(snapshot("Fitness Tracker", "49.99", false), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CartStoreError::Cart(CartError::OutOfStock { .. })));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_cart_resets() {
        let session = memory_session();
        session.insert(session_keys::CART, "not a cart").await.unwrap();
        let store = CartStore::new(&session);
        assert!(store.load().await.unwrap().is_empty());
        assert!(session.get_value(session_keys::CART).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let session = memory_session();
        let store = CartStore::new(&session);
        store.add(snapshot("Mug", "8.50", true), 3).await.unwrap();
        assert!(store.clear().await.unwrap().is_empty());
        assert_eq!(store.load().await.unwrap().total_items(), 0);
    }
}
