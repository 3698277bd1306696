//! Catalog API Endpoints
//! Mission: CRUD over books; access is gated by the router, not here

use crate::catalog::{
    models::{
        BookCreatedResponse, BookListResponse, BookPatch, BookResponse, BookUpdatedResponse,
        MessageResponse, NewBook,
    },
    store::{BookStore, CatalogError},
};
use crate::errors::ApiError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogState {
    pub books: Arc<BookStore>,
}

/// Ids are opaque to clients; one that is not a UUID matches no book
fn parse_book_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| CatalogError::NotFound.into())
}

/// GET /books
pub async fn list_books(
    State(state): State<CatalogState>,
) -> Result<Json<BookListResponse>, ApiError> {
    let books = state.books.find().await?;
    Ok(Json(BookListResponse {
        message: "Books retrieved successfully",
        books,
    }))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let id = parse_book_id(&id)?;
    let book = state
        .books
        .find_by_id(&id)
        .await?
        .ok_or(CatalogError::NotFound)?;

    Ok(Json(BookResponse {
        message: "A book retrieved successfully",
        data: book,
    }))
}

/// POST /books
pub async fn create_book(
    State(state): State<CatalogState>,
    payload: Result<Json<NewBook>, JsonRejection>,
) -> Result<(StatusCode, Json<BookCreatedResponse>), ApiError> {
    let Json(data) = payload?;
    let book = state.books.create(data).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookCreatedResponse {
            message: "Book created successfully",
            book,
        }),
    ))
}

/// PUT /books/:id
pub async fn update_book(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
    payload: Result<Json<BookPatch>, JsonRejection>,
) -> Result<Json<BookUpdatedResponse>, ApiError> {
    let Json(patch) = payload?;
    if patch.is_empty() {
        return Err(ApiError::Validation(
            "No data provided for update".to_string(),
        ));
    }
    let id = parse_book_id(&id)?;

    let updated_book = state.books.update_by_id(&id, patch).await?;

    Ok(Json(BookUpdatedResponse {
        message: "Book updated successfully",
        updated_book,
    }))
}

/// DELETE /books/:id
pub async fn delete_book(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_book_id(&id)?;
    state.books.delete_by_id(&id).await?;

    Ok(Json(MessageResponse {
        message: "Book deleted successfully",
    }))
}
