//! Integration tests for registration, sign-in and sign-out.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (hs-cli migrate)
//! - The storefront running (cargo run -p harbor-shop-storefront)
//!
//! Run with: cargo test -p harbor-shop-integration-tests -- --ignored

use harbor_shop_integration_tests::{base_url, client, notices, register, unique_email};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn session(client: &reqwest::Client) -> Value {
    client
        .get(format!("{}/api/session", base_url()))
        .send()
        .await
        .expect("Failed to get session")
        .json()
        .await
        .expect("Failed to read session")
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_register_signs_in() {
    let client = client();
    let email = unique_email();

    let view = register(&client, &email).await;
    assert_eq!(view["authenticated"], true);
    assert_eq!(view["admin"], false);
    assert_eq!(view["user"]["email"], email.as_str());
    assert_eq!(view["profile"]["full_name"], "Integration Tester");

    assert_eq!(session(&client).await["authenticated"], true);
    assert!(notices(&client).await.contains(&"Registration successful!".to_string()));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_duplicate_registration_conflicts() {
    let email = unique_email();
    register(&client(), &email).await;

    let resp = client()
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "name": "Someone Else",
            "email": email,
            "password": "hunter22",
            "confirm_password": "hunter22",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_registration_validation() {
    let resp = client()
        .post(format!("{}/api/auth/register", base_url()))
        .json(&json!({
            "name": "",
            "email": "not-an-email",
            "password": "abc",
            "confirm_password": "xyz",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to read error");
    for field in ["name", "email", "password", "confirm_password"] {
        assert!(body["fields"].get(field).is_some(), "missing error for {field}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_login_logout_cycle() {
    let email = unique_email();
    register(&client(), &email).await;

    let client = client();
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email, "password": "wrong-password"}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(session(&client).await["authenticated"], false);

    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email.to_uppercase(), "password": "hunter22"}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(session(&client).await["authenticated"], true);

    let resp = client
        .post(format!("{}/api/auth/logout", base_url()))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::OK);

    let view = session(&client).await;
    assert_eq!(view["authenticated"], false);
    assert!(view["user"].is_null());
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_profile_update_refreshes_session() {
    let client = client();
    register(&client, &unique_email()).await;
    notices(&client).await;

    let resp = client
        .put(format!("{}/api/account/profile", base_url()))
        .json(&json!({"full_name": "  Grace Hopper ", "avatar_url": ""}))
        .send()
        .await
        .expect("Failed to update profile");
    assert_eq!(resp.status(), StatusCode::OK);
    let view: Value = resp.json().await.expect("Failed to read session");
    assert_eq!(view["profile"]["full_name"], "Grace Hopper");
    assert!(view["profile"]["avatar_url"].is_null());

    assert_eq!(session(&client).await["profile"]["full_name"], "Grace Hopper");
    assert!(notices(&client).await.contains(&"Profile updated successfully".to_string()));
}
