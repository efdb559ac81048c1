use super::*;
use axum::{
    body::{self, Body},
    http::Request,
    response::Response,
};
use serde::de::DeserializeOwned;
use shared::protocol::{book_route, ChapterInput};
use tower::ServiceExt;

async fn test_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let app = build_router(Arc::new(AppState {
        api: ApiContext {
            storage: storage.clone(),
        },
    }));
    (app, storage)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json")
}

fn fiction_body() -> serde_json::Value {
    serde_json::json!({
        "title": "The Long Night",
        "bookType": "fiction",
        "genre": "mystery",
        "targetAudience": "adult",
        "writingTone": 7,
        "themes": ["justice", "identity"],
        "chapters": [
            { "number": 1, "title": "Arrival" },
            { "number": 2, "title": "The Letter" }
        ]
    })
}

async fn create(app: &Router, body: serde_json::Value) -> BookId {
    let response = app
        .clone()
        .oneshot(json_request("POST", books_route(), body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: CreateBookResponse = read_json(response).await;
    assert!(created.success);
    created.book_id
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage) = test_app().await;
    let response = app
        .oneshot(empty_request("GET", "/healthz"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn create_then_fetch_returns_book_with_chapters() {
    let (app, _storage) = test_app().await;
    let book_id = create(&app, fiction_body()).await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", &book_route(book_id)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: BookResponse = read_json(response).await;
    assert!(fetched.success);
    assert_eq!(fetched.book.id, book_id);
    assert_eq!(fetched.book.title, "The Long Night");
    assert_eq!(fetched.book.writing_tone, Some(7));
    let titles: Vec<_> = fetched
        .book
        .chapters
        .iter()
        .map(|chapter| chapter.title.as_str())
        .collect();
    assert_eq!(titles, ["Arrival", "The Letter"]);
}

#[tokio::test]
async fn list_returns_newest_book_first() {
    let (app, _storage) = test_app().await;
    let first = create(&app, fiction_body()).await;
    let second = create(
        &app,
        serde_json::json!({
            "title": "Field Notes",
            "bookType": "non-fiction",
            "category": "science",
            "chapters": []
        }),
    )
    .await;

    let response = app
        .oneshot(empty_request("GET", books_route()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let listed: BookListResponse = read_json(response).await;
    let ids: Vec<_> = listed.books.iter().map(|book| book.id).collect();
    assert_eq!(ids, [second, first]);
}

#[tokio::test]
async fn create_rejects_short_title_with_validation_error() {
    let (app, storage) = test_app().await;
    let mut body = fiction_body();
    body["title"] = serde_json::json!("ab");

    let response = app
        .oneshot(json_request("POST", books_route(), body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(storage.list_books().await.expect("list").is_empty());
}

#[tokio::test]
async fn malformed_json_uses_shared_error_shape() {
    let (app, _storage) = test_app().await;
    let request = Request::post(books_route())
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn missing_book_is_not_found_for_every_verb() {
    let (app, _storage) = test_app().await;
    let uri = book_route(BookId(404));

    let get = app
        .clone()
        .oneshot(empty_request("GET", &uri))
        .await
        .expect("response");
    assert_eq!(get.status(), StatusCode::NOT_FOUND);
    let err: ApiError = read_json(get).await;
    assert_eq!(err.code, ErrorCode::NotFound);

    let put = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            serde_json::json!({ "title": "Renamed book" }),
        ))
        .await
        .expect("response");
    assert_eq!(put.status(), StatusCode::NOT_FOUND);

    let delete = app
        .oneshot(empty_request("DELETE", &uri))
        .await
        .expect("response");
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_replaces_chapters_and_keeps_unsent_fields() {
    let (app, storage) = test_app().await;
    let book_id = create(&app, fiction_body()).await;

    let update = UpdateBookRequest {
        title: "The Longer Night".to_string(),
        chapters: Some(vec![ChapterInput {
            number: 1,
            title: "Only Chapter".to_string(),
        }]),
        ..UpdateBookRequest::default()
    };
    let response = app
        .oneshot(json_request(
            "PUT",
            &book_route(book_id),
            serde_json::to_value(&update).expect("json"),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let message: MessageResponse = read_json(response).await;
    assert!(message.success);
    assert_eq!(message.message, "Book updated successfully");

    let book = storage
        .get_book(book_id)
        .await
        .expect("get")
        .expect("book exists");
    assert_eq!(book.title, "The Longer Night");
    assert_eq!(book.genre.as_deref(), Some("mystery"));
    assert_eq!(book.chapters.len(), 1);
    assert_eq!(book.chapters[0].title, "Only Chapter");
}

#[tokio::test]
async fn delete_removes_book_and_chapters() {
    let (app, storage) = test_app().await;
    let book_id = create(&app, fiction_body()).await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &book_route(book_id)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let message: MessageResponse = read_json(response).await;
    assert_eq!(message.message, "Book deleted successfully");

    assert!(storage.get_book(book_id).await.expect("get").is_none());
    assert!(storage
        .list_chapters(book_id)
        .await
        .expect("chapters")
        .is_empty());

    let again = app
        .oneshot(empty_request("GET", &book_route(book_id)))
        .await
        .expect("response");
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (app, _storage) = test_app().await;
    let mut body = fiction_body();
    body["title"] = serde_json::json!("x".repeat(MAX_BODY_BYTES + 1));

    let response = app
        .oneshot(json_request("POST", books_route(), body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
