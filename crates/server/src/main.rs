use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use server_api::{create_book, delete_book, get_book, health, list_books, update_book, ApiContext};
use shared::{
    domain::BookId,
    error::{ApiError, ErrorCode},
    protocol::{
        books_route, BookListResponse, BookResponse, CreateBookRequest, CreateBookResponse,
        MessageResponse, UpdateBookRequest,
    },
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

const MAX_BODY_BYTES: usize = 1024 * 1024;

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = settings.database_url;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            books_route(),
            get(http_list_books).post(http_create_book),
        )
        .route(
            &format!("{}/:book_id", books_route()),
            get(http_get_book)
                .put(http_update_book)
                .delete(http_delete_book),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    health(&state.api).await.map_err(|err| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Internal, err.message)),
        )
    })?;
    Ok("ok")
}

async fn http_create_book(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookResponse>), HttpError> {
    let Json(req) = body.map_err(rejected_body)?;
    let book_id = create_book(&state.api, &req).await.map_err(http_error)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateBookResponse {
            success: true,
            book_id,
            message: "Book created successfully".to_string(),
        }),
    ))
}

async fn http_list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BookListResponse>, HttpError> {
    let books = list_books(&state.api).await.map_err(http_error)?;
    Ok(Json(BookListResponse {
        success: true,
        books,
    }))
}

async fn http_get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<i64>,
) -> Result<Json<BookResponse>, HttpError> {
    let book = get_book(&state.api, BookId(book_id))
        .await
        .map_err(http_error)?;
    Ok(Json(BookResponse {
        success: true,
        book,
    }))
}

async fn http_update_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<i64>,
    body: Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let Json(req) = body.map_err(rejected_body)?;
    update_book(&state.api, BookId(book_id), &req)
        .await
        .map_err(http_error)?;
    Ok(Json(MessageResponse::ok("Book updated successfully")))
}

async fn http_delete_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<i64>,
) -> Result<Json<MessageResponse>, HttpError> {
    delete_book(&state.api, BookId(book_id))
        .await
        .map_err(http_error)?;
    Ok(Json(MessageResponse::ok("Book deleted successfully")))
}

fn http_error(err: ApiError) -> HttpError {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

/// Malformed or oversized bodies keep axum's status but use the shared error shape.
fn rejected_body(rejection: JsonRejection) -> HttpError {
    (
        rejection.status(),
        Json(ApiError::new(ErrorCode::Validation, rejection.body_text())),
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
