use shared::{
    protocol::{ChapterInput, CreateBookRequest, UpdateBookRequest},
    validation::{validate_create, validate_update},
};
use storage::Storage;

#[tokio::test]
async fn validated_requests_round_trip_through_the_store() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    let create = CreateBookRequest {
        title: "The Lighthouse".to_string(),
        book_type: "non-fiction".to_string(),
        genre: None,
        category: Some("science".to_string()),
        target_audience: Some("young-adult".to_string()),
        writing_tone: Some(3),
        themes: None,
        chapters: vec![
            ChapterInput {
                number: 1,
                title: "Light".to_string(),
            },
            ChapterInput {
                number: 2,
                title: "Lenses".to_string(),
            },
        ],
    };
    let id = storage
        .create_book(&validate_create(&create).expect("valid create"))
        .await
        .expect("create");

    let update = UpdateBookRequest {
        title: "The Lighthouse, Revised".to_string(),
        chapters: Some(vec![ChapterInput {
            number: 1,
            title: "Everything".to_string(),
        }]),
        ..Default::default()
    };
    let found = storage
        .update_book(id, &validate_update(&update).expect("valid update"))
        .await
        .expect("update");
    assert!(found);

    let books = storage.list_books().await.expect("list");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "The Lighthouse, Revised");
    assert_eq!(books[0].category.as_deref(), Some("science"));
    assert!(books[0].themes.is_none());
    assert_eq!(books[0].chapters.len(), 1);

    assert!(storage.delete_book(id).await.expect("delete"));
    assert!(storage.list_books().await.expect("list").is_empty());
}
