//! In-process routing tests.
//!
//! These run the full router with an in-memory session store. None of the
//! requests reach a handler that queries the database.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};

use bookstore_integration_tests::{TEST_BASE_URL, body_text, send};
use bookstore_storefront::middleware::LOGIN_REDIRECT;

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

fn post_form(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("valid request")
}

fn location(response: &axum::http::Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    for uri in [
        "/customer/profile",
        "/customer/profile/personal_info",
        "/customer/profile/membership",
        "/customer/profile/orders",
        "/customer/profile/wishlist",
        "/customer/profile/cart",
        "/customer/profile/cart/checkout",
        "/customer/profile/cart/payment/success",
        "/customer/profile/cart/payment/failure?error=no_branch",
    ] {
        let response = send(get(uri)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {uri}");
        assert_eq!(location(&response), Some(LOGIN_REDIRECT), "GET {uri}");
    }
}

#[tokio::test]
async fn test_anonymous_cart_mutations_are_rejected() {
    for (uri, body) in [
        ("/customer/profile/cart/add_book/1", "cart_quantity=5"),
        ("/customer/profile/cart/remove_book/1", ""),
        ("/customer/profile/branch/update", "new_branch=7"),
        ("/customer/profile/cart/payment", "method=card"),
        ("/customer/profile/wishlist/add_book/1", ""),
        ("/books/1/add_review", "rating=5&review_text=great"),
    ] {
        let response = send(post_form(uri, body)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "POST {uri}");
        assert_eq!(location(&response), Some(LOGIN_REDIRECT), "POST {uri}");
    }
}

#[tokio::test]
async fn test_login_page_shows_login_required_message() {
    let response = send(get(LOGIN_REDIRECT)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("You need to log in first."));
    assert!(body.contains(r#"action="/login""#));
}

#[tokio::test]
async fn test_unknown_flash_code_uses_generic_message() {
    let response = send(get("/login?error=%3Cscript%3E")).await;
    let body = body_text(response).await;
    assert!(body.contains("Something went wrong. Please try again."));
    assert!(!body.contains("<script>"));
}

#[tokio::test]
async fn test_signup_page_renders_form() {
    let response = send(get("/signup")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    for field in ["username", "password", "first_name", "last_name"] {
        assert!(body.contains(&format!(r#"name="{field}""#)), "missing {field}");
    }
}

#[tokio::test]
async fn test_logout_redirects_home() {
    let response = send(post_form("/logout", "")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/?success=logged_out"));
}

// ============================================================================
// Health and sitemap
// ============================================================================

#[tokio::test]
async fn test_health() {
    let response = send(get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "it-123")
        .body(Body::empty())
        .expect("valid request");
    let response = send(request).await;
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("it-123")
    );
}

#[tokio::test]
async fn test_sitemap_xml_uses_absolute_urls() {
    let response = send(get("/sitemap.xml")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/xml")
    );

    let body = body_text(response).await;
    assert!(body.contains(&format!("<loc>{TEST_BASE_URL}/books</loc>")));
}

#[tokio::test]
async fn test_sitemap_page_lists_sections() {
    let body = body_text(send(get("/sitemap")).await).await;
    assert!(body.contains(r#"href="/books""#));
    assert!(body.contains(r#"href="/customer/profile""#));
}

#[tokio::test]
async fn test_home_shows_login_links_for_guests() {
    let body = body_text(send(get("/")).await).await;
    assert!(body.contains(r#"href="/login""#));
    assert!(!body.contains("Log out"));
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let response = send(get("/static/css/main.css")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("body"));
}
