//! Catalog product.

use chrono::{DateTime, Utc};
use serde::Serialize;

use harbor_shop_core::{Price, ProductId, ProductSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The data a cart line keeps about this product.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            category: self.category.clone(),
            in_stock: self.in_stock,
        }
    }
}
