//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use tracing::instrument;

use bookstore_core::BookId;

use super::PageContext;
use crate::db::CustomerRepository;
use crate::error::AppError;
use crate::filters;
use crate::flash::{self, MessageQuery};
use crate::middleware::RequireIdentity;
use crate::models::WishlistEntry;
use crate::services::ServiceError;
use crate::state::AppState;

const WISHLIST: &str = "/customer/profile/wishlist";

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/wishlist.html")]
pub struct WishlistTemplate {
    pub page: PageContext,
    pub entries: Vec<WishlistEntry>,
}

/// Display the wishlist.
#[instrument(skip_all, fields(customer_id = %identity.customer_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Query(query): Query<MessageQuery>,
) -> Result<WishlistTemplate, AppError> {
    let entries = CustomerRepository::new(state.pool())
        .wishlist(&identity.username)
        .await?;

    Ok(WishlistTemplate {
        page: PageContext::for_customer(&identity, query),
        entries,
    })
}

/// Add a book to the wishlist.
#[instrument(skip(state, identity), fields(customer_id = %identity.customer_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(book_id): Path<BookId>,
) -> Redirect {
    match CustomerRepository::new(state.pool())
        .add_to_wishlist(identity.customer_id, book_id)
        .await
    {
        Ok(()) => flash::redirect_success(WISHLIST, "wishlist_added"),
        Err(e) => {
            let err = ServiceError::from_repository(e, "book");
            err.log("add_to_wishlist");
            flash::redirect_error(WISHLIST, err.code())
        }
    }
}

/// Remove a book from the wishlist.
#[instrument(skip(state, identity), fields(customer_id = %identity.customer_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(book_id): Path<BookId>,
) -> Redirect {
    match CustomerRepository::new(state.pool())
        .remove_from_wishlist(identity.customer_id, book_id)
        .await
    {
        Ok(()) => flash::redirect_success(WISHLIST, "wishlist_removed"),
        Err(e) => {
            let err = ServiceError::from(e);
            err.log("remove_from_wishlist");
            flash::redirect_error(WISHLIST, err.code())
        }
    }
}
