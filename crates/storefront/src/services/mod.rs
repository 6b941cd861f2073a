//! Business logic services for the storefront.
//!
//! Services are built per request over borrowed resources (the pool, the
//! session, the catalog cache). Storage sits behind small traits where the
//! logic is worth testing without a database.
//!
//! # Services
//!
//! - `session` - Identity and profile kept in the server session
//! - `auth` - Password registration and login
//! - `notices` - Flash messages queued for the client
//! - `cart` - Session-backed cart store
//! - `checkout` - Order placement
//! - `orders` - Order history and cancellation
//! - `catalog` - Cached product reads
//! - `admin_catalog` - Product CRUD for admins
//! - `account` - Profile edits

pub mod account;
pub mod admin_catalog;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notices;
pub mod orders;
pub mod session;
