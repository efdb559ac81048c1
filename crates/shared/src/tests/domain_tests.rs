use super::*;

#[test]
fn book_type_parses_its_wire_names() {
    assert_eq!("fiction".parse::<BookType>(), Ok(BookType::Fiction));
    assert_eq!("non-fiction".parse::<BookType>(), Ok(BookType::NonFiction));
    assert_eq!(BookType::NonFiction.to_string(), "non-fiction");
}

#[test]
fn unknown_book_type_is_a_std_error_with_message() {
    let err = "poetry".parse::<BookType>().expect_err("unknown");
    assert_eq!(err, UnknownBookType("poetry".to_string()));

    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert_eq!(boxed.to_string(), "unknown book type 'poetry'");
}

#[test]
fn ids_display_as_plain_numbers() {
    assert_eq!(BookId(42).to_string(), "42");
    assert_eq!(ChapterId(7).to_string(), "7");
}
