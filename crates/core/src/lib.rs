//! Harbor Shop Core - Domain types and pure storefront logic.
//!
//! This crate provides the types and rules shared across Harbor Shop components:
//! - `storefront` - Public-facing JSON API (catalog, cart, checkout, orders, admin)
//! - `cli` - Command-line tools for migrations, seeding and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database access,
//! no HTTP. Cart arithmetic, the checkout quote and input validation live here so
//! they can be tested without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`cart`] - The session cart and its invariants
//! - [`checkout`] - Order quote (subtotal, tax, total) and shipping address
//! - [`validation`] - Form validation performed before any network call

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartError, CartLine, MAX_LINE_QUANTITY, ProductSnapshot};
pub use checkout::{MAX_ORDER_TOTAL, OrderQuote, ShippingAddress, TAX_RATE};
pub use types::*;
pub use validation::{ProductDraft, ProductInput, ValidationErrors};
