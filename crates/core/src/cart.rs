//! The shopping cart.
//!
//! A [`Cart`] is an ordered list of lines with at most one line per product.
//! Every line has a quantity of at least one. These invariants hold after any
//! sequence of operations, including a round-trip through serde: deserializing
//! merges duplicate product lines and lifts zero quantities to one.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 9999;

/// Errors from cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("{name} is out of stock")]
    OutOfStock { name: String },
    #[error("a cart line can hold at most {max} items")]
    QuantityLimit { max: u32 },
}

/// Product data captured in the cart when it is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: Option<String>,
    pub category: String,
    pub in_stock: bool,
}

/// One product and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

#[derive(Deserialize)]
struct RawCart {
    #[serde(default)]
    lines: Vec<CartLine>,
}

/// The cart held in the visitor's session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCart")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl From<RawCart> for Cart {
    fn from(raw: RawCart) -> Self {
        let mut cart = Self::default();
        for mut line in raw.lines {
            line.quantity = line.quantity.clamp(1, MAX_LINE_QUANTITY);
            match cart.position(line.product.id) {
                Some(idx) => {
                    if let Some(existing) = cart.lines.get_mut(idx) {
                        existing.quantity = existing
                            .quantity
                            .saturating_add(line.quantity)
                            .min(MAX_LINE_QUANTITY);
                    }
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.lines.iter().position(|l| l.product.id == product_id)
    }

    /// Add `quantity` of a product, merging with an existing line.
    ///
    /// The snapshot on an existing line is refreshed with the latest product
    /// data.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for zero, `OutOfStock` if the
    /// product is not in stock and `QuantityLimit` past [`MAX_LINE_QUANTITY`].
    pub fn add(&mut self, product: ProductSnapshot, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if !product.in_stock {
            return Err(CartError::OutOfStock { name: product.name });
        }
        let limit = CartError::QuantityLimit {
            max: MAX_LINE_QUANTITY,
        };

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            let next = line
                .quantity
                .checked_add(quantity)
                .filter(|q| *q <= MAX_LINE_QUANTITY)
                .ok_or(limit)?;
            line.quantity = next;
            line.product = product;
        } else {
            if quantity > MAX_LINE_QUANTITY {
                return Err(limit);
            }
            self.lines.push(CartLine { product, quantity });
        }
        Ok(())
    }

    /// Set a line's quantity, clamping into `1..=MAX_LINE_QUANTITY`.
    ///
    /// Returns `false` if the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        match self.lines.iter_mut().find(|l| l.product.id == product_id) {
            Some(line) => {
                line.quantity = quantity.clamp(1, MAX_LINE_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Increase a line by one, up to the line limit.
    pub fn increment(&mut self, product_id: ProductId) -> bool {
        self.line(product_id)
            .map(|l| l.quantity.saturating_add(1))
            .is_some_and(|q| self.update_quantity(product_id, q))
    }

    /// Decrease a line by one. A line at one stays at one.
    pub fn decrement(&mut self, product_id: ProductId) -> bool {
        self.line(product_id)
            .map(|l| l.quantity.saturating_sub(1))
            .is_some_and(|q| self.update_quantity(product_id, q))
    }

    /// Remove a product's line. Returns whether a line existed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of line totals, exact and unrounded.
    #[must_use]
    pub fn total_price(&self) -> Price {
        let amount = self.lines.iter().map(|l| l.line_total().amount).sum();
        Price::usd(amount)
    }
}
