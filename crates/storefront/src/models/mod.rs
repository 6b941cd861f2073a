//! Domain models for the storefront.
//!
//! These types are validated domain objects, separate from database row types.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{NewOrder, NewOrderItem, Order, OrderBreakdown, OrderItem, PlacedOrder};
pub use product::Product;
pub use session::{CurrentUser, keys as session_keys};
pub use user::{Profile, User};
