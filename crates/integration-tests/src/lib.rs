//! Integration tests for Harbor Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed a database, then start the storefront
//! cargo run -p harbor-shop-cli -- migrate
//! cargo run -p harbor-shop-cli -- seed products
//! cargo run -p harbor-shop-storefront
//!
//! # Run the ignored end-to-end tests
//! cargo test -p harbor-shop-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_TEST_URL` - Running storefront (default: `http://localhost:3000`)
//! - `STOREFRONT_DATABASE_URL` - Same database, used to promote test admins

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the storefront API (configurable via environment).
pub fn base_url() -> String {
    std::env::var("STOREFRONT_TEST_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Client with its own cookie jar and its own client address.
///
/// Each client sends a distinct `x-forwarded-for` so auth rate limits are
/// per test rather than shared by the whole run.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
pub fn client() -> Client {
    let [a, b, c, ..] = *Uuid::new_v4().as_bytes();
    let mut headers = HeaderMap::new();
    if let Ok(ip) = HeaderValue::from_str(&format!("10.{a}.{b}.{c}")) {
        headers.insert("x-forwarded-for", ip);
    }
    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// Fresh address for a throwaway account.
pub fn unique_email() -> String {
    format!("it-{}@example.com", Uuid::new_v4().simple())
}

/// Register `email` with a fixed password, leaving `client` signed in.
///
/// # Panics
///
/// Panics if the request fails or registration is refused.
pub async fn register(client: &Client, email: &str) -> Value {
    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "name": "Integration Tester",
            "email": email,
            "password": "hunter22",
            "confirm_password": "hunter22",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    resp.json().await.expect("Failed to read session")
}

/// First in-stock product from the seeded catalog.
///
/// # Panics
///
/// Panics if the catalog is unreachable or has nothing in stock.
pub async fn in_stock_product(client: &Client) -> Value {
    let products: Vec<Value> = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to read products");
    products
        .into_iter()
        .find(|p| p["in_stock"] == true)
        .expect("Seeded catalog has no in-stock product")
}

/// Drain and return the queued notice messages.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn notices(client: &Client) -> Vec<String> {
    let notices: Vec<Value> = client
        .get(format!("{}/api/notices", base_url()))
        .send()
        .await
        .expect("Failed to get notices")
        .json()
        .await
        .expect("Failed to read notices");
    notices
        .iter()
        .filter_map(|n| n["message"].as_str().map(str::to_owned))
        .collect()
}
