//! Book catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use bookstore_core::{BookId, Rating};

use super::PageContext;
use crate::db::{CatalogRepository, CustomerRepository};
use crate::error::AppError;
use crate::filters;
use crate::flash::{self, MessageQuery};
use crate::middleware::{OptionalIdentity, RequireIdentity};
use crate::models::{Book, BookCategory, BookStock, Review};
use crate::services::{ServiceError, ValidationError};
use crate::state::AppState;

/// Review form data. Rating arrives as raw text.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: String,
    #[serde(default)]
    pub review_text: String,
}

/// Book listing template.
#[derive(Template, WebTemplate)]
#[template(path = "books/index.html")]
pub struct BooksTemplate {
    pub page: PageContext,
    pub books: Vec<Book>,
}

/// Book detail template.
#[derive(Template, WebTemplate)]
#[template(path = "books/show.html")]
pub struct BookTemplate {
    pub page: PageContext,
    pub book: Book,
    pub reviews: Vec<Review>,
    pub categories: Vec<BookCategory>,
    pub stock: Vec<BookStock>,
}

/// Display all books.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    Query(query): Query<MessageQuery>,
) -> Result<BooksTemplate, AppError> {
    let books = CatalogRepository::new(state.pool()).list_books().await?;
    Ok(BooksTemplate {
        page: PageContext::new(identity.as_ref(), query),
        books,
    })
}

/// Display one book with its reviews, categories and stock.
#[instrument(skip(state, identity, query))]
pub async fn show(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    Path(book_id): Path<BookId>,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let catalog = CatalogRepository::new(state.pool());
    let Some(book) = catalog.get_book(book_id).await? else {
        return Ok(flash::redirect_error("/books", "book_not_found").into_response());
    };

    let (reviews, categories, stock) = tokio::try_join!(
        catalog.reviews(book_id),
        catalog.categories(book_id),
        catalog.stock(book_id),
    )?;

    Ok(BookTemplate {
        page: PageContext::new(identity.as_ref(), query),
        book,
        reviews,
        categories,
        stock,
    }
    .into_response())
}

/// Create or replace the logged-in customer's review.
#[instrument(skip(state, identity, form), fields(customer_id = %identity.customer_id))]
pub async fn add_review(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Path(book_id): Path<BookId>,
    Form(form): Form<ReviewForm>,
) -> Response {
    let back = format!("/books/{book_id}");

    let rating = match Rating::parse(&form.rating) {
        Ok(rating) => rating,
        Err(e) => {
            let err = ServiceError::from(ValidationError::from(e));
            err.log("add_review");
            return flash::redirect_error(&back, err.code()).into_response();
        }
    };

    let result = CustomerRepository::new(state.pool())
        .upsert_review(identity.customer_id, book_id, rating, form.review_text.trim())
        .await
        .map_err(|e| ServiceError::from_repository(e, "book"));

    match result {
        Ok(()) => flash::redirect_success(&back, "review_saved").into_response(),
        Err(e) => {
            e.log("add_review");
            flash::redirect_error(&back, e.code()).into_response()
        }
    }
}
