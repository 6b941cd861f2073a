//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Database readiness
//!
//! # Session
//! GET    /api/session                     - Identity, profile and admin flag
//! GET    /api/notices                     - Drain queued notices
//!
//! # Auth (register and login are rate limited)
//! POST   /api/auth/register               - Register and sign in
//! POST   /api/auth/login                  - Sign in
//! POST   /api/auth/logout                 - Sign out
//!
//! # Catalog
//! GET    /api/products                    - Listing (?category=&q=)
//! GET    /api/products/categories         - Category labels
//! GET    /api/products/{id}               - Detail with related products
//!
//! # Cart
//! GET    /api/cart                        - Cart with quote
//! DELETE /api/cart                        - Clear
//! POST   /api/cart/items                  - Add {product_id, quantity?}
//! PUT    /api/cart/items/{product_id}     - Set quantity
//! DELETE /api/cart/items/{product_id}     - Remove
//!
//! # Checkout and orders (requires auth)
//! POST   /api/checkout                    - Place order
//! GET    /api/orders                      - Order history
//! GET    /api/orders/{id}                 - Order detail
//! POST   /api/orders/{id}/cancel          - Cancel
//!
//! # Account (requires auth)
//! GET    /api/account                     - Profile
//! PUT    /api/account/profile             - Update profile
//!
//! # Admin (requires admin)
//! GET    /api/admin/products              - All products (?q=)
//! POST   /api/admin/products              - Create
//! PUT    /api/admin/products/{id}         - Update
//! DELETE /api/admin/products/{id}         - Delete
//! PUT    /api/admin/products/{id}/stock   - Set availability
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod notices;
pub mod orders;
pub mod products;
pub mod session;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// The limiter wraps only the credential routes; signing out is never throttled.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/categories", get(products::categories))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{product_id}",
            put(cart::update).delete(cart::remove),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show))
        .route("/profile", put(account::update_profile))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(admin::index).post(admin::create))
        .route(
            "/products/{id}",
            put(admin::update).delete(admin::delete),
        )
        .route("/products/{id}/stock", put(admin::set_stock))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(session::show))
        .route("/notices", get(notices::drain))
        .route("/checkout", post(checkout::place_order))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/account", account_routes())
        .nest("/admin", admin_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .fallback(not_found)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("no such route".to_string())
}
