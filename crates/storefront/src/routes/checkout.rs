//! Checkout route handlers.
//!
//! The review page lists the cart, branch and payment methods. The payment
//! post runs the purchase; its outcome is reported through the success and
//! failure redirects, which land on order history and the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::PageContext;
use super::cart::{CART, CartItemView};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::flash::{self, MessageQuery};
use crate::middleware::RequireIdentity;
use crate::models::{Branch, Membership, PaymentMethod};
use crate::services::{CheckoutOrchestrator, CheckoutStage, ServiceError};
use crate::state::AppState;

const PAYMENT_SUCCESS: &str = "/customer/profile/cart/payment/success";
const PAYMENT_FAILURE: &str = "/customer/profile/cart/payment/failure";
const ORDERS: &str = "/customer/profile/orders";

/// Payment form data.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub method: String,
}

/// Checkout review template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub items: Vec<CartItemView>,
    pub total: String,
    pub membership: Option<Membership>,
    pub branches: Vec<Branch>,
    pub selected_branch: Option<Branch>,
    pub payment_methods: Vec<PaymentMethod>,
    pub stage: CheckoutStage,
}

/// Display the checkout review. An empty cart sends the customer back.
#[instrument(skip_all, fields(customer_id = %identity.customer_id))]
pub async fn review(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let review = match CheckoutOrchestrator::new(state.store())
        .review(&identity)
        .await
    {
        Ok(review) => review,
        Err(e @ ServiceError::Validation(_)) => {
            e.log("checkout_review");
            return Ok(flash::redirect_error(CART, e.code()).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(CheckoutTemplate {
        page: PageContext::for_customer(&identity, query),
        items: review.lines.iter().map(CartItemView::from).collect(),
        total: review.total.display(),
        membership: review.membership,
        branches: review.branches,
        selected_branch: review.selected_branch,
        payment_methods: review.payment_methods,
        stage: review.stage,
    }
    .into_response())
}

/// Complete the purchase with the chosen payment method.
#[instrument(skip_all, fields(customer_id = %identity.customer_id))]
pub async fn pay(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Form(form): Form<PaymentForm>,
) -> Redirect {
    match CheckoutOrchestrator::new(state.store())
        .complete_checkout(&identity, &form.method)
        .await
    {
        Ok(receipt) => {
            add_breadcrumb(
                "checkout",
                "Order placed",
                &[
                    ("branch", receipt.branch.store_name.as_str()),
                    ("payment_method", receipt.payment_method.as_str()),
                ],
            );
            Redirect::to(PAYMENT_SUCCESS)
        }
        Err(e) => {
            e.log("complete_checkout");
            let code = match e {
                ServiceError::Storage(_) => "payment_failed",
                ref other => other.code(),
            };
            flash::redirect_error(PAYMENT_FAILURE, code)
        }
    }
}

/// Payment succeeded: show the new order.
pub async fn success(RequireIdentity(_identity): RequireIdentity) -> Redirect {
    flash::redirect_success(ORDERS, "order_placed")
}

/// Payment failed: back to the cart, keeping the reason.
pub async fn failure(
    RequireIdentity(_identity): RequireIdentity,
    Query(query): Query<MessageQuery>,
) -> Redirect {
    let code = query
        .error
        .filter(|c| is_message_code(c))
        .unwrap_or_else(|| "payment_failed".to_string());
    flash::redirect_error(CART, &code)
}

/// Codes are short snake_case identifiers; anything else is dropped.
fn is_message_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 32
        && code.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_message_code() {
        assert!(is_message_code("no_branch"));
        assert!(!is_message_code(""));
        assert!(!is_message_code("x&success=order_placed"));
        assert!(!is_message_code(&"a".repeat(40)));
    }
}
