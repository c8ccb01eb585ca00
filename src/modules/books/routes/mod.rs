//! HTTP handlers for `/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::error::AppError;

use super::models::{Book, BookInput, BookList, Deleted};
use super::repository::BookRepository;

pub fn router(repository: BookRepository) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(show_book).put(update_book).delete(delete_book),
        )
        .with_state(repository)
}

fn book_not_found(id: &str) -> AppError {
    AppError::not_found(format!("Book not found: {id}"))
}

async fn create_book(
    State(repository): State<BookRepository>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(input) = payload?;
    let new_book = input.validate()?;

    let book = repository
        .create(&new_book)
        .await
        .map_err(AppError::internal)?;

    tracing::info!(book_id = %book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

async fn list_books(State(repository): State<BookRepository>) -> Result<Json<BookList>, AppError> {
    let books = repository.list().await.map_err(AppError::internal)?;
    Ok(Json(BookList::from(books)))
}

async fn show_book(
    State(repository): State<BookRepository>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    repository
        .get(&id)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(|| book_not_found(&id))
}

async fn update_book(
    State(repository): State<BookRepository>,
    Path(id): Path<String>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let Json(input) = payload?;
    let replacement = input.validate()?;

    let book = repository
        .update(&id, &replacement)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| book_not_found(&id))?;

    tracing::info!(book_id = %book.id, "book updated");
    Ok(Json(book))
}

async fn delete_book(
    State(repository): State<BookRepository>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    let book = repository
        .delete(&id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| book_not_found(&id))?;

    tracing::info!(book_id = %book.id, "book deleted");
    Ok(Json(Deleted {
        message: "Book deleted successfully".to_string(),
        id: book.id,
    }))
}
