use shared::{
    domain::{Book, BookId},
    error::{ApiError, ErrorCode},
    protocol::{CreateBookRequest, UpdateBookRequest},
    validation::{validate_create, validate_update},
};
use storage::Storage;
use tracing::{error, info};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn health(ctx: &ApiContext) -> Result<(), ApiError> {
    ctx.storage.health_check().await.map_err(internal)
}

pub async fn create_book(ctx: &ApiContext, request: &CreateBookRequest) -> Result<BookId, ApiError> {
    let book = validate_create(request)?;
    let book_id = ctx.storage.create_book(&book).await.map_err(internal)?;
    info!(%book_id, title = %book.title, chapters = book.chapters.len(), "book created");
    Ok(book_id)
}

pub async fn list_books(ctx: &ApiContext) -> Result<Vec<Book>, ApiError> {
    ctx.storage.list_books().await.map_err(internal)
}

pub async fn get_book(ctx: &ApiContext, book_id: BookId) -> Result<Book, ApiError> {
    ctx.storage
        .get_book(book_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| book_not_found(book_id))
}

/// Applies a partial update. When the request carries chapters they replace
/// the book's whole chapter list.
pub async fn update_book(
    ctx: &ApiContext,
    book_id: BookId,
    request: &UpdateBookRequest,
) -> Result<(), ApiError> {
    let changes = validate_update(request)?;
    let found = ctx
        .storage
        .update_book(book_id, &changes)
        .await
        .map_err(internal)?;
    if !found {
        return Err(book_not_found(book_id));
    }
    info!(%book_id, replaced_chapters = changes.chapters.is_some(), "book updated");
    Ok(())
}

pub async fn delete_book(ctx: &ApiContext, book_id: BookId) -> Result<(), ApiError> {
    let deleted = ctx.storage.delete_book(book_id).await.map_err(internal)?;
    if !deleted {
        return Err(book_not_found(book_id));
    }
    info!(%book_id, "book deleted");
    Ok(())
}

fn book_not_found(book_id: BookId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("Book {book_id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = %format!("{err:#}"), "storage operation failed");
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
