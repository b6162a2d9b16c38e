//! HTTP handlers for `/api/books`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookshelf_http::{ApiJson, ApiQuery, AppError};
use bookshelf_kernel::settings::PaginationSettings;
use serde_json::{Map, Value};

use super::error::BookError;
use super::models::{Book, BookUpdate, CreateBook, ListParams};
use super::store::BookStore;

/// Shared handler state: the injected store and list defaults.
#[derive(Clone)]
pub struct BooksState {
    pub store: Arc<dyn BookStore>,
    pub pagination: PaginationSettings,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(state)
}

async fn create_book(
    State(state): State<BooksState>,
    ApiJson(body): ApiJson<CreateBook>,
) -> Result<(StatusCode, Json<Book>), BookError> {
    let new_book = body.validate()?;
    let book = state.store.insert(new_book).await?;
    tracing::info!(book_id = %book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(
    State(state): State<BooksState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Vec<Book>>, BookError> {
    let (filter, page) = params.into_query(&state.pagination)?;
    let books = state.store.find(&filter, page).await?;
    tracing::debug!(?filter, skip = page.skip, limit = ?page.limit, count = books.len(), "books listed");
    Ok(Json(books))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, BookError> {
    state
        .store
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or(BookError::NotFound)
}

/// Store failures during an update are reported as 400, unlike the other
/// endpoints.
async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<Book>, AppError> {
    apply_update(&state, &id, body)
        .await
        .map(Json)
        .map_err(|err| err.into_app_error(StatusCode::BAD_REQUEST))
}

async fn apply_update(
    state: &BooksState,
    id: &str,
    body: Map<String, Value>,
) -> Result<Book, BookError> {
    let update = BookUpdate::from_body(body)?;
    let mut book = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(BookError::NotFound)?;

    update.apply(&mut book)?;
    state.store.save(&book).await?;
    tracing::info!(book_id = %book.id, "book updated");
    Ok(book)
}

async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, BookError> {
    let book = state
        .store
        .delete_by_id(&id)
        .await?
        .ok_or(BookError::NotFound)?;
    tracing::info!(book_id = %book.id, "book deleted");
    Ok(Json(book))
}
