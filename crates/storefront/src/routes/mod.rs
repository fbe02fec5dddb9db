//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Home page
//! GET  /health                             - Liveness check
//! GET  /health/ready                       - Readiness check (database)
//! GET  /sitemap, /sitemap.xml              - Sitemaps
//!
//! # Auth
//! GET  /signup, /login                     - Forms
//! POST /signup, /login                     - Actions (rate limited)
//! GET  /logout, POST /logout               - Clear session
//!
//! # Books
//! GET  /books                              - Book listing
//! GET  /books/{book_id}                    - Detail with reviews, categories and stock
//! POST /books/{book_id}/add_review         - Create or replace a review (auth)
//!
//! # Customer (all require auth)
//! GET  /customer/profile                               - Profile landing
//! GET  /customer/profile/personal_info                 - Profile form
//! POST /customer/profile/personal_info                 - Update profile
//! GET  /customer/profile/wishlist                      - Wishlist
//! POST /customer/profile/wishlist/add_book/{book_id}   - Add to wishlist
//! POST /customer/profile/wishlist/remove_book/{book_id}- Remove from wishlist
//! GET  /customer/profile/membership                    - Membership details
//! GET  /customer/profile/orders                        - Order history
//!
//! # Cart and checkout (all require auth)
//! GET  /customer/profile/cart                          - Cart page
//! POST /customer/profile/branch/update                 - Select branch
//! POST /customer/profile/cart/add_book/{book_id}       - Add line
//! POST /customer/profile/cart/remove_book/{book_id}    - Remove line
//! GET  /customer/profile/cart/checkout                 - Checkout review
//! POST /customer/profile/cart/checkout                 - Checkout review
//! POST /customer/profile/cart/payment                  - Complete purchase
//! GET  /customer/profile/cart/payment/success          - Redirect to orders
//! GET  /customer/profile/cart/payment/failure          - Redirect to cart
//! ```

pub mod account;
pub mod auth;
pub mod books;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::flash::{Flash, MessageQuery};
use crate::middleware::auth_rate_limiter;
use crate::models::Identity;
use crate::state::AppState;

/// Navigation and message state every page renders.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub username: Option<String>,
    pub flash: Flash,
}

impl PageContext {
    #[must_use]
    pub fn new(identity: Option<&Identity>, query: MessageQuery) -> Self {
        Self {
            username: identity.map(|i| i.username.to_string()),
            flash: Flash::from(query),
        }
    }

    /// Context for a page behind the identity gate.
    #[must_use]
    pub fn for_customer(identity: &Identity, query: MessageQuery) -> Self {
        Self::new(Some(identity), query)
    }
}

/// Create the auth routes router.
///
/// Only the form posts pass through the rate limiter.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route("/signup", get(auth::signup_page))
        .route(
            "/signup",
            post(auth::signup).layer(auth_rate_limiter(trust_proxy_headers)),
        )
        .route("/login", get(auth::login_page))
        .route(
            "/login",
            post(auth::login).layer(auth_rate_limiter(trust_proxy_headers)),
        )
        .route("/logout", get(auth::logout).post(auth::logout))
}

/// Create the book routes router.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(books::index))
        .route("/{book_id}", get(books::show))
        .route("/{book_id}/add_review", post(books::add_review))
}

/// Create the customer profile routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile))
        .route(
            "/personal_info",
            get(account::personal_info).post(account::update_personal_info),
        )
        .route("/membership", get(account::membership))
        .route("/orders", get(account::orders))
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/add_book/{book_id}", post(wishlist::add))
        .route("/wishlist/remove_book/{book_id}", post(wishlist::remove))
        .route("/branch/update", post(cart::update_branch))
        .route("/cart", get(cart::show))
        .route("/cart/add_book/{book_id}", post(cart::add))
        .route("/cart/remove_book/{book_id}", post(cart::remove))
        .route(
            "/cart/checkout",
            get(checkout::review).post(checkout::review),
        )
        .route("/cart/payment", post(checkout::pay))
        .route("/cart/payment/success", get(checkout::success))
        .route("/cart/payment/failure", get(checkout::failure))
}

/// Create all routes for the storefront.
pub fn routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/sitemap", get(home::sitemap_html))
        .route("/sitemap.xml", get(home::sitemap_xml))
        .merge(auth_routes(trust_proxy_headers))
        .nest("/books", book_routes())
        .nest("/customer/profile", customer_routes())
}
