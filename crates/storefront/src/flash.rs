//! Messages carried across redirects.
//!
//! A form handler redirects with `?error=<code>` or `?success=<code>`; the
//! next page looks the code up here. Only these fixed texts are ever shown,
//! so database error text cannot reach a customer.

use axum::response::Redirect;
use serde::Deserialize;

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Resolved messages for a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

impl From<MessageQuery> for Flash {
    fn from(query: MessageQuery) -> Self {
        Self {
            error: query.error.as_deref().map(error_message),
            success: query.success.as_deref().and_then(success_message),
        }
    }
}

/// Text for an error code. Unknown codes get a generic message.
#[must_use]
pub fn error_message(code: &str) -> &'static str {
    match code {
        "login_required" => "You need to log in first.",
        "invalid_credentials" => "Invalid username or password.",
        "invalid_username" => "Usernames must be 1 to 50 characters with no spaces.",
        "missing_password" => "Please choose a password.",
        "missing_name" => "First and last name are required.",
        "username_taken" => "That username is already taken.",
        "invalid_quantity" => "Quantity must be a whole number between 1 and 999.",
        "invalid_rating" => "Rating must be between 1 and 5.",
        "no_branch" => "Please select a branch before paying.",
        "empty_cart" => "Your cart is empty.",
        "no_payment_method" => "Please choose a payment method.",
        "missing_field" => "Please fill in all required fields.",
        "invalid_field" => "One of the fields could not be read.",
        "book_not_found" => "Book not found.",
        "customer_not_found" => "Customer not found.",
        "membership_not_found" => "Membership details not found.",
        "not_found" => "That item no longer exists.",
        "payment_failed" => "Payment could not be completed. Your cart has not been changed.",
        "rate_limited" => "Too many attempts. Please wait a minute and try again.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Text for a success code.
#[must_use]
pub fn success_message(code: &str) -> Option<&'static str> {
    Some(match code {
        "account_created" => "Account created successfully. Please log in.",
        "logged_in" => "Login successful!",
        "logged_out" => "You have been logged out.",
        "profile_updated" => "Profile updated successfully.",
        "review_saved" => "Review submitted successfully.",
        "wishlist_added" => "Book added to wishlist successfully.",
        "wishlist_removed" => "Book removed from wishlist successfully.",
        "cart_added" => "Book added to cart successfully.",
        "cart_removed" => "Book removed from cart successfully.",
        "branch_updated" => "Branch updated.",
        "order_placed" => "Thank you! Your order has been placed.",
        _ => return None,
    })
}

/// Redirect to `path` with an error code.
#[must_use]
pub fn redirect_error(path: &str, code: &str) -> Redirect {
    Redirect::to(&with_param(path, "error", code))
}

/// Redirect to `path` with a success code.
#[must_use]
pub fn redirect_success(path: &str, code: &str) -> Redirect {
    Redirect::to(&with_param(path, "success", code))
}

fn with_param(path: &str, key: &str, code: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{key}={code}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_error_code_is_generic() {
        assert_eq!(
            error_message("relation \"cart\" does not exist"),
            "Something went wrong. Please try again."
        );
    }

    #[test]
    fn test_unknown_success_code_is_dropped() {
        let flash = Flash::from(MessageQuery {
            error: None,
            success: Some("<script>".to_string()),
        });
        assert_eq!(flash, Flash::default());
    }

    #[test]
    fn test_with_param() {
        assert_eq!(with_param("/books", "error", "x"), "/books?error=x");
        assert_eq!(with_param("/a?b=1", "success", "y"), "/a?b=1&success=y");
    }
}
