//! Cart route handlers.
//!
//! Every handler takes [`RequireIdentity`], so the cart manager is only
//! reached for a logged-in customer, and always with that customer's ID.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use bookstore_core::{BookId, BranchId};

use super::PageContext;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::flash::{self, MessageQuery};
use crate::middleware::RequireIdentity;
use crate::models::{Branch, CartLine};
use crate::services::{CartManager, CartPage, ServiceError, ValidationError};
use crate::state::AppState;

pub(crate) const CART: &str = "/customer/profile/cart";

/// Add-to-cart form data. The quantity is validated by the cart manager.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    #[serde(default)]
    pub cart_quantity: String,
}

/// Branch selection form data.
#[derive(Debug, Deserialize)]
pub struct BranchForm {
    #[serde(default)]
    pub new_branch: String,
}

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub book_id: BookId,
    pub title: String,
    pub quantity: i32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            book_id: line.book_id,
            title: line.title.clone(),
            quantity: line.quantity,
            price: bookstore_core::Price::usd(line.price).display(),
            line_price: line.line_price().display(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub items: Vec<CartItemView>,
    pub total: String,
    pub branches: Vec<Branch>,
    pub selected_branch: Option<Branch>,
}

impl CartTemplate {
    /// Whether `branch` is the customer's current selection.
    #[must_use]
    pub fn is_selected(&self, branch: &Branch) -> bool {
        self.selected_branch
            .as_ref()
            .is_some_and(|s| s.branch_id == branch.branch_id)
    }
}

/// Display the cart.
#[instrument(skip_all, fields(customer_id = %identity.customer_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(query): Query<MessageQuery>,
) -> Result<CartTemplate, AppError> {
    let CartPage {
        lines,
        total,
        branches,
        selected_branch,
    } = CartManager::new(state.store())
        .cart_page(identity.customer_id)
        .await?;

    Ok(CartTemplate {
        page: PageContext::for_customer(&identity, query),
        items: lines.iter().map(CartItemView::from).collect(),
        total: total.display(),
        branches,
        selected_branch,
    })
}

/// Add copies of a book to the cart.
///
/// On failure the customer goes back to the book page with the cart
/// unchanged.
#[instrument(skip(state, identity, form), fields(customer_id = %identity.customer_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(book_id): Path<BookId>,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    match CartManager::new(state.store())
        .add_line(identity.customer_id, book_id, &form.cart_quantity)
        .await
    {
        Ok(quantity) => {
            let (book, copies) = (book_id.to_string(), quantity.to_string());
            add_breadcrumb(
                "cart",
                "Added book to cart",
                &[("book_id", book.as_str()), ("quantity", copies.as_str())],
            );
            flash::redirect_success(CART, "cart_added")
        }
        Err(e) => {
            e.log("add_to_cart");
            let back = match e {
                ServiceError::NotFound(_) => "/books".to_string(),
                _ => format!("/books/{book_id}"),
            };
            flash::redirect_error(&back, e.code())
        }
    }
}

/// Remove a book from the cart.
#[instrument(skip(state, identity), fields(customer_id = %identity.customer_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(book_id): Path<BookId>,
) -> Redirect {
    match CartManager::new(state.store())
        .remove_line(identity.customer_id, book_id)
        .await
    {
        Ok(()) => flash::redirect_success(CART, "cart_removed"),
        Err(e) => {
            e.log("remove_from_cart");
            flash::redirect_error(CART, e.code())
        }
    }
}

/// Select the fulfilment branch.
#[instrument(skip_all, fields(customer_id = %identity.customer_id))]
pub async fn update_branch(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Form(form): Form<BranchForm>,
) -> Redirect {
    let result = match parse_branch(&form.new_branch) {
        Ok(branch_id) => {
            CartManager::new(state.store())
                .set_branch(identity.customer_id, branch_id)
                .await
        }
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => flash::redirect_success(CART, "branch_updated"),
        Err(e) => {
            e.log("update_branch");
            flash::redirect_error(CART, e.code())
        }
    }
}

fn parse_branch(raw: &str) -> Result<BranchId, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingField("branch"));
    }
    raw.parse::<i32>()
        .map(BranchId::new)
        .map_err(|_| ValidationError::InvalidField("branch"))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_parse_branch() {
        assert_eq!(parse_branch(" 7 "), Ok(BranchId::new(7)));
        assert_eq!(parse_branch(""), Err(ValidationError::MissingField("branch")));
        assert_eq!(parse_branch("main"), Err(ValidationError::InvalidField("branch")));
    }

    #[test]
    fn test_cart_item_view_formats_prices() {
        let line = CartLine {
            book_id: BookId::new(1),
            title: "Dune".to_string(),
            quantity: 3,
            price: Decimal::new(1099, 2),
        };
        let view = CartItemView::from(&line);
        assert_eq!(view.price, "$10.99");
        assert_eq!(view.line_price, "$32.97");
    }
}
