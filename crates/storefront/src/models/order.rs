//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use harbor_shop_core::{
    Cart, OrderId, OrderItemId, OrderQuote, OrderStatus, Price, ProductId, ShippingAddress, UserId,
};

/// One line of a placed order. `price` is the unit price at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
    pub product_name: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Price,
    pub shipping_address: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// Subtotal, tax and total shown on the order detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderBreakdown {
    pub subtotal: Price,
    pub tax: Price,
    pub total: Price,
}

impl Order {
    /// Recompute the breakdown from the captured lines.
    ///
    /// Tax is whatever the stored total carries above the line subtotal.
    #[must_use]
    pub fn breakdown(&self) -> OrderBreakdown {
        let subtotal = Price::usd(self.items.iter().map(|i| i.line_total().amount).sum())
            .round_to_cents();
        let total = self.total_amount;
        let tax = Price::new(
            total.amount.saturating_sub(subtotal.amount),
            total.currency_code,
        );
        OrderBreakdown {
            subtotal,
            tax,
            total,
        }
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// A line to insert when placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
    pub product_name: String,
    pub image_url: Option<String>,
    pub category: String,
}

/// Everything needed to insert an order and its lines in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Price,
    pub shipping_address: String,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Capture the cart's lines at their current unit prices.
    #[must_use]
    pub fn from_cart(
        user_id: UserId,
        cart: &Cart,
        quote: &OrderQuote,
        address: &ShippingAddress,
    ) -> Self {
        Self {
            id: OrderId::generate(),
            user_id,
            total_amount: quote.total,
            shipping_address: address.to_single_line(),
            items: cart
                .lines()
                .iter()
                .map(|line| NewOrderItem {
                    product_id: line.product.id,
                    quantity: line.quantity,
                    unit_price: line.product.price.round_to_cents(),
                    product_name: line.product.name.clone(),
                    image_url: line.product.image_url.clone(),
                    category: line.product.category.clone(),
                })
                .collect(),
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order: Order,
    /// Where the client should navigate next.
    pub confirmation_path: String,
}

impl PlacedOrder {
    #[must_use]
    pub fn new(order: Order) -> Self {
        let confirmation_path = format!("/order-confirmation?order_id={}", order.id);
        Self {
            order,
            confirmation_path,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use harbor_shop_core::ProductSnapshot;
    use rust_decimal::Decimal;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(quantity: u32, price: &str) -> OrderItem {
        OrderItem {
            id: OrderItemId::generate(),
            product_id: ProductId::generate(),
            quantity,
            price: Price::usd(dec(price)),
            product_name: Some("Coffee Maker".to_string()),
            image_url: None,
            category: Some("Home".to_string()),
        }
    }

    fn order(total: &str, items: Vec<OrderItem>) -> Order {
        Order {
            id: OrderId::generate(),
            user_id: UserId::generate(),
            total_amount: Price::usd(dec(total)),
            shipping_address: "1 Pier Rd, Portland, ME 04101".to_string(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            items,
        }
    }

    #[test]
    fn test_breakdown_from_lines() {
        let order = order("27.00", vec![item(2, "10.00"), item(1, "5.00")]);
        let breakdown = order.breakdown();
        assert_eq!(breakdown.subtotal.amount, dec("25.00"));
        assert_eq!(breakdown.tax.amount, dec("2.00"));
        assert_eq!(breakdown.total.amount, dec("27.00"));
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_new_order_from_cart() {
        let mut cart = Cart::new();
        let product = ProductSnapshot {
            id: ProductId::generate(),
            name: "Bluetooth Speaker".to_string(),
            description: String::new(),
            price: Price::usd(dec("89.99")),
            image_url: None,
            category: "Electronics".to_string(),
            in_stock: true,
        };
        cart.add(product.clone(), 2).unwrap();
        let quote = OrderQuote::for_cart(&cart);
        let address = ShippingAddress {
            street: "1 Pier Rd".to_string(),
            city: "Portland".to_string(),
            state: "ME".to_string(),
            zip: "04101".to_string(),
        };

        let new_order = NewOrder::from_cart(UserId::generate(), &cart, &quote, &address);
        assert_eq!(new_order.total_amount.amount, dec("194.38"));
        assert_eq!(new_order.shipping_address, "1 Pier Rd, Portland, ME 04101");
        assert_eq!(
            new_order.items,
            vec![NewOrderItem {
                product_id: product.id,
                quantity: 2,
                unit_price: product.price,
                product_name: "Bluetooth Speaker".to_string(),
                image_url: None,
                category: "Electronics".to_string(),
            }]
        );
    }

    #[test]
    fn test_confirmation_path() {
        let placed = PlacedOrder::new(order("1.08", vec![item(1, "1.00")]));
        assert_eq!(
            placed.confirmation_path,
            format!("/order-confirmation?order_id={}", placed.order.id)
        );
    }
}
