//! Logged-in cart and checkout handlers, driven in-process.
//!
//! The router runs over the in-memory store backend, so every redirect and
//! flash code below comes from the real handlers while the store's state can
//! be inspected and made to fail.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use rust_decimal::Decimal;

use bookstore_integration_tests::{SessionClient, body_text, location, memory_app};
use bookstore_storefront::db::MemoryStore;
use bookstore_storefront::models::Membership;

const CART: &str = "/customer/profile/cart";
const PAYMENT: &str = "/customer/profile/cart/payment";
const CHECKOUT: &str = "/customer/profile/cart/checkout";

fn bookstore() -> MemoryStore {
    MemoryStore::new()
        .with_book(1, "Dune", Decimal::new(1000, 2))
        .with_book(2, "Emma", Decimal::new(450, 2))
        .with_branch(7, "Store7")
}

/// A logged-in client for `reader`, plus the store behind it.
async fn reader() -> (SessionClient, MemoryStore) {
    let store = bookstore();
    store.add_customer("reader", "correct-horse");
    let mut client = SessionClient::new(memory_app(store.clone()));
    client.login("reader", "correct-horse").await;
    (client, store)
}

// ============================================================================
// Cart lines
// ============================================================================

#[tokio::test]
async fn test_invalid_quantity_returns_to_book_page() {
    let (mut client, store) = reader().await;

    for quantity in ["0", "abc", "", "1000"] {
        let response = client
            .post_form(
                &format!("{CART}/add_book/1"),
                &format!("cart_quantity={quantity}"),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{quantity:?}");
        assert_eq!(
            location(&response),
            Some("/books/1?error=invalid_quantity"),
            "{quantity:?}"
        );
    }
    assert_eq!(store.carts_created(), 0);
}

#[tokio::test]
async fn test_unknown_book_returns_to_listing() {
    let (mut client, store) = reader().await;

    let response = client
        .post_form(&format!("{CART}/add_book/99"), "cart_quantity=1")
        .await;
    assert_eq!(location(&response), Some("/books?error=not_found"));
    assert_eq!(store.carts_created(), 0);
}

#[tokio::test]
async fn test_add_and_remove_lines() {
    let (mut client, store) = reader().await;

    let response = client
        .post_form(&format!("{CART}/add_book/1"), "cart_quantity=2")
        .await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart?success=cart_added")
    );
    let response = client
        .post_form(&format!("{CART}/add_book/2"), "cart_quantity=1")
        .await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart?success=cart_added")
    );
    assert_eq!(store.carts_created(), 1);

    let body = body_text(client.get(CART).await).await;
    assert!(body.contains("Dune"));
    assert!(body.contains("Emma"));
    assert!(body.contains("$24.50"));

    let response = client.post_form(&format!("{CART}/remove_book/1"), "").await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart?success=cart_removed")
    );

    let body = body_text(client.get(CART).await).await;
    assert!(!body.contains("Dune"));
    assert!(body.contains("$4.50"));
}

#[tokio::test]
async fn test_branch_selection() {
    let (mut client, _store) = reader().await;

    let response = client
        .post_form("/customer/profile/branch/update", "new_branch=")
        .await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart?error=missing_field")
    );

    let response = client
        .post_form("/customer/profile/branch/update", "new_branch=99")
        .await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart?error=not_found")
    );

    let response = client
        .post_form("/customer/profile/branch/update", "new_branch=7")
        .await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart?success=branch_updated")
    );
    let body = body_text(client.get(CART).await).await;
    assert!(body.contains(r#"<option value="7" selected>Store7</option>"#));
}

// ============================================================================
// Checkout review
// ============================================================================

#[tokio::test]
async fn test_review_of_empty_cart_returns_to_cart() {
    let (mut client, _store) = reader().await;

    let response = client.get(CHECKOUT).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart?error=empty_cart")
    );
}

#[tokio::test]
async fn test_review_shows_membership_details() {
    let store = bookstore().with_membership(
        "reader",
        Membership {
            loyalty_points: 120,
            discount_rate: Decimal::new(5, 2),
            membership_status: "Gold".to_string(),
            shipping_discount: Decimal::new(250, 2),
        },
    );
    store.add_customer("reader", "correct-horse");
    let mut client = SessionClient::new(memory_app(store));
    client.login("reader", "correct-horse").await;
    client
        .post_form(&format!("{CART}/add_book/1"), "cart_quantity=1")
        .await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(CHECKOUT)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::empty())
        .expect("valid request");
    let response = client.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    for expected in ["Gold", "120", "0.05", "2.50", "No branch selected", "card", "cash"] {
        assert!(body.contains(expected), "missing {expected}");
    }
}

// ============================================================================
// Payment
// ============================================================================

#[tokio::test]
async fn test_payment_without_branch_keeps_cart() {
    let (mut client, store) = reader().await;
    client
        .post_form(&format!("{CART}/add_book/1"), "cart_quantity=2")
        .await;

    let response = client.post_form(PAYMENT, "method=card").await;
    let failure = location(&response).map(str::to_owned);
    assert_eq!(
        failure.as_deref(),
        Some("/customer/profile/cart/payment/failure?error=no_branch")
    );

    let response = client.get(&failure.unwrap_or_default()).await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart?error=no_branch")
    );

    let body = body_text(client.get("/customer/profile/cart?error=no_branch").await).await;
    assert!(body.contains("Please select a branch before paying."));
    assert!(body.contains("Dune"));
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_reported_generically() {
    let (mut client, store) = reader().await;
    client
        .post_form(&format!("{CART}/add_book/1"), "cart_quantity=2")
        .await;
    client
        .post_form("/customer/profile/branch/update", "new_branch=7")
        .await;
    store.fail_on("delete_customer_cart");

    let response = client.post_form(PAYMENT, "method=card").await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart/payment/failure?error=payment_failed")
    );

    let response = client
        .get("/customer/profile/cart/payment/failure?error=payment_failed")
        .await;
    let cart = location(&response).map(str::to_owned).unwrap_or_default();
    assert_eq!(cart, "/customer/profile/cart?error=payment_failed");

    store.clear_faults();
    let body = body_text(client.get(&cart).await).await;
    assert!(body.contains("Payment could not be completed."));
    assert!(!body.contains("injected failure"));
    assert!(body.contains("Dune"));
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn test_successful_payment_places_order() {
    let (mut client, store) = reader().await;
    client
        .post_form(&format!("{CART}/add_book/1"), "cart_quantity=2")
        .await;
    client
        .post_form("/customer/profile/branch/update", "new_branch=7")
        .await;

    let response = client.post_form(PAYMENT, "method=cash").await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart/payment/success")
    );

    let response = client.get("/customer/profile/cart/payment/success").await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/orders?success=order_placed")
    );

    let orders = store.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].payment_method, "cash");
    assert_eq!(orders[0].total, Decimal::new(2000, 2));

    let body = body_text(client.get(CART).await).await;
    assert!(body.contains("Your cart is empty."));
}

#[tokio::test]
async fn test_blank_payment_method_is_rejected() {
    let (mut client, store) = reader().await;
    client
        .post_form(&format!("{CART}/add_book/1"), "cart_quantity=1")
        .await;

    let response = client.post_form(PAYMENT, "method=").await;
    assert_eq!(
        location(&response),
        Some("/customer/profile/cart/payment/failure?error=no_payment_method")
    );
    assert!(store.orders().is_empty());
}

// ============================================================================
// Login rate limiting
// ============================================================================

#[tokio::test]
async fn test_forwarded_header_does_not_reset_login_limit() {
    let store = bookstore();
    let mut client = SessionClient::new(memory_app(store));

    let mut statuses = Vec::new();
    for n in 1..=6 {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", format!("203.0.113.{n}"))
            .body(Body::from("username=reader&password=wrong"))
            .expect("valid request");
        statuses.push(client.send(request).await.status());
    }

    assert!(statuses[..5].iter().all(|s| *s == StatusCode::SEE_OTHER));
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
}
