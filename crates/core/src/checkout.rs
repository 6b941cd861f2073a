//! Checkout pricing and shipping address.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::Price;
use crate::validation::ValidationErrors;

/// Sales tax applied to every order (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Largest order total an order row can hold (`NUMERIC(12, 2)`).
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Amounts charged for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderQuote {
    /// Price a cart. Subtotal and tax are rounded to cents; total is their sum.
    #[must_use]
    pub fn for_cart(cart: &Cart) -> Self {
        Self::for_subtotal(cart.total_price())
    }

    #[must_use]
    pub fn for_subtotal(subtotal: Price) -> Self {
        let subtotal = subtotal.round_to_cents();
        let tax = Price::new(
            subtotal.amount.saturating_mul(TAX_RATE),
            subtotal.currency_code,
        )
        .round_to_cents();
        let total = Price::new(
            subtotal.amount.saturating_add(tax.amount),
            subtotal.currency_code,
        );
        Self {
            subtotal,
            tax,
            total,
        }
    }

    /// True when the total cannot be stored on an order.
    #[must_use]
    pub fn exceeds_order_limit(&self) -> bool {
        self.total.amount > MAX_ORDER_TOTAL
    }
}

/// Where an order ships to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
}

impl ShippingAddress {
    /// Require every field to be present.
    ///
    /// # Errors
    ///
    /// Returns the set of blank fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value, label) in [
            ("street", &self.street, "Street address"),
            ("city", &self.city, "City"),
            ("state", &self.state, "State"),
            ("zip", &self.zip, "ZIP code"),
        ] {
            if value.trim().is_empty() {
                errors.add(field, format!("{label} is required"));
            }
        }
        errors.into_result()
    }

    /// The form stored on the order: `"street, city, state zip"`.
    #[must_use]
    pub fn to_single_line(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street.trim(),
            self.city.trim(),
            self.state.trim(),
            self.zip.trim()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::cart::ProductSnapshot;
    use crate::types::ProductId;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn snapshot(price: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::generate(),
            name: "Item".to_string(),
            description: String::new(),
            price: Price::usd(dec(price)),
            image_url: None,
            category: "Home".to_string(),
            in_stock: true,
        }
    }

    #[test]
    fn test_quote_for_cart() {
        let mut cart = Cart::new();
        cart.add(snapshot("10.00"), 2).unwrap();
        cart.add(snapshot("5.00"), 1).unwrap();

        let quote = OrderQuote::for_cart(&cart);
        assert_eq!(quote.subtotal.amount, dec("25.00"));
        assert_eq!(quote.tax.amount, dec("2.00"));
        assert_eq!(quote.total.amount, dec("27.00"));
        assert_eq!(quote.total.to_string(), "$27.00");
    }

    #[test]
    fn test_quote_rounds_to_cents() {
        let quote = OrderQuote::for_subtotal(Price::usd(dec("0.3125")));
        assert_eq!(quote.subtotal.amount, dec("0.31"));
        let quote = OrderQuote::for_subtotal(Price::usd(dec("18.5625")));
        // 18.56 * 0.08 = 1.4848
        assert_eq!(quote.tax.amount, dec("1.48"));
        assert_eq!(quote.total.amount, dec("20.04"));
    }

    #[test]
    fn test_empty_cart_quote_is_zero() {
        let quote = OrderQuote::for_cart(&Cart::new());
        assert!(quote.total.is_zero());
    }

    #[test]
    fn test_order_limit() {
        assert_eq!(MAX_ORDER_TOTAL, dec("9999999999.99"));

        let mut cart = Cart::new();
        cart.add(snapshot("99999999.99"), 92).unwrap();
        let quote = OrderQuote::for_cart(&cart);
        assert_eq!(quote.total.amount, dec("9935999999.01"));
        assert!(!quote.exceeds_order_limit());

        cart.add(snapshot("99999999.99"), 1).unwrap();
        assert!(OrderQuote::for_cart(&cart).exceeds_order_limit());
    }

    #[test]
    fn test_address_validation() {
        let address = ShippingAddress {
            street: "1 Pier Rd".to_string(),
            city: "  ".to_string(),
            state: "ME".to_string(),
            zip: String::new(),
        };
        let errors = address.validate().unwrap_err();
        assert_eq!(errors.get("city"), Some("City is required"));
        assert_eq!(errors.get("zip"), Some("ZIP code is required"));
        assert!(errors.get("street").is_none());
    }

    #[test]
    fn test_address_single_line() {
        let address = ShippingAddress {
            street: "1 Pier Rd".to_string(),
            city: "Portland".to_string(),
            state: "ME".to_string(),
            zip: "04101".to_string(),
        };
        assert!(address.validate().is_ok());
        assert_eq!(address.to_single_line(), "1 Pier Rd, Portland, ME 04101");
    }
}
