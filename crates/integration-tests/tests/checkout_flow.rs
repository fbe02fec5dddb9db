//! End-to-end checkout against a running storefront.
//!
//! These tests require:
//! - A running `PostgreSQL` database with the bookstore schema and seed data
//!   (at least book 1 and branch 1)
//! - The storefront running (cargo run -p bookstore-storefront)
//!
//! Run with: cargo test -p bookstore-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use uuid::Uuid;

use bookstore_integration_tests::live_base_url;

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

fn unique_username() -> String {
    format!("it_{}", Uuid::new_v4().simple())
}

/// Sign up and log in a fresh customer, returning the logged-in client.
async fn logged_in_client(base_url: &str) -> Client {
    let client = client();
    let username = unique_username();

    let resp = client
        .post(format!("{base_url}/signup"))
        .form(&[
            ("username", username.as_str()),
            ("password", "correct horse"),
            ("first_name", "Test"),
            ("last_name", "Customer"),
        ])
        .send()
        .await
        .expect("Failed to sign up");
    assert!(resp.url().as_str().contains("success=account_created"));

    let resp = client
        .post(format!("{base_url}/login"))
        .form(&[("username", username.as_str()), ("password", "correct horse")])
        .send()
        .await
        .expect("Failed to log in");
    assert!(resp.url().as_str().contains("success=logged_in"));

    client
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_full_checkout_flow() {
    let base_url = live_base_url();
    let client = logged_in_client(&base_url).await;

    let resp = client
        .post(format!("{base_url}/customer/profile/cart/add_book/1"))
        .form(&[("cart_quantity", "2")])
        .send()
        .await
        .expect("Failed to add to cart");
    assert!(resp.url().as_str().contains("success=cart_added"));

    let resp = client
        .post(format!("{base_url}/customer/profile/branch/update"))
        .form(&[("new_branch", "1")])
        .send()
        .await
        .expect("Failed to select branch");
    assert!(resp.url().as_str().contains("success=branch_updated"));

    let resp = client
        .post(format!("{base_url}/customer/profile/cart/payment"))
        .form(&[("method", "card")])
        .send()
        .await
        .expect("Failed to pay");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.url().path().ends_with("/customer/profile/orders"));
    let body = resp.text().await.expect("Failed to read orders page");
    assert!(body.contains("Thank you! Your order has been placed."));
    assert!(body.contains("by card"));

    let cart = client
        .get(format!("{base_url}/customer/profile/cart"))
        .send()
        .await
        .expect("Failed to load cart")
        .text()
        .await
        .expect("Failed to read cart page");
    assert!(cart.contains("Your cart is empty."));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_payment_without_branch_keeps_cart() {
    let base_url = live_base_url();
    let client = logged_in_client(&base_url).await;

    client
        .post(format!("{base_url}/customer/profile/cart/add_book/1"))
        .form(&[("cart_quantity", "1")])
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .post(format!("{base_url}/customer/profile/cart/payment"))
        .form(&[("method", "card")])
        .send()
        .await
        .expect("Failed to pay");
    assert!(resp.url().path().ends_with("/customer/profile/cart"));
    assert!(resp.url().as_str().contains("error=no_branch"));

    let body = resp.text().await.expect("Failed to read cart page");
    assert!(body.contains("Please select a branch before paying."));
    assert!(!body.contains("Your cart is empty."));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_invalid_quantity_is_rejected() {
    let base_url = live_base_url();
    let client = logged_in_client(&base_url).await;

    let resp = client
        .post(format!("{base_url}/customer/profile/cart/add_book/1"))
        .form(&[("cart_quantity", "0")])
        .send()
        .await
        .expect("Failed to post quantity");
    assert!(resp.url().as_str().contains("error=invalid_quantity"));
}
