//! Field checks applied to book payloads before they reach the store.

use thiserror::Error;

use crate::{
    domain::{BookChanges, BookType, NewBook, NewChapter},
    error::ApiError,
    protocol::{ChapterInput, CreateBookRequest, UpdateBookRequest},
};

pub const MIN_TITLE_CHARS: usize = 3;
pub const MIN_WRITING_TONE: i64 = 1;
pub const MAX_WRITING_TONE: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title must be at least 3 characters")]
    TitleTooShort,
    #[error("bookType must be one of: fiction, non-fiction (got '{0}')")]
    UnknownBookType(String),
    #[error("writingTone must be between 1 and 10 (got {0})")]
    WritingToneOutOfRange(i64),
    #[error("chapter number must be positive (got {0})")]
    ChapterNumberNotPositive(i64),
    #[error("chapter {0} title must not be empty")]
    EmptyChapterTitle(i64),
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        ApiError::validation(value.to_string())
    }
}

pub fn validate_create(request: &CreateBookRequest) -> Result<NewBook, ValidationError> {
    validate_title(&request.title)?;
    let book_type = parse_book_type(&request.book_type)?;
    validate_writing_tone(request.writing_tone)?;
    let chapters = validate_chapters(&request.chapters)?;

    Ok(NewBook {
        title: request.title.clone(),
        book_type,
        genre: request.genre.clone(),
        category: request.category.clone(),
        target_audience: request.target_audience.clone(),
        writing_tone: request.writing_tone,
        themes: request.themes.clone(),
        chapters,
    })
}

pub fn validate_update(request: &UpdateBookRequest) -> Result<BookChanges, ValidationError> {
    validate_title(&request.title)?;
    let book_type = request
        .book_type
        .as_deref()
        .map(parse_book_type)
        .transpose()?;
    validate_writing_tone(request.writing_tone)?;
    let chapters = request
        .chapters
        .as_deref()
        .map(validate_chapters)
        .transpose()?;

    Ok(BookChanges {
        title: request.title.clone(),
        book_type,
        genre: request.genre.clone(),
        category: request.category.clone(),
        target_audience: request.target_audience.clone(),
        writing_tone: request.writing_tone,
        themes: request.themes.clone(),
        chapters,
    })
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.chars().count() < MIN_TITLE_CHARS {
        return Err(ValidationError::TitleTooShort);
    }
    Ok(())
}

fn parse_book_type(raw: &str) -> Result<BookType, ValidationError> {
    raw.parse()
        .map_err(|_| ValidationError::UnknownBookType(raw.to_string()))
}

fn validate_writing_tone(tone: Option<i64>) -> Result<(), ValidationError> {
    match tone {
        Some(value) if !(MIN_WRITING_TONE..=MAX_WRITING_TONE).contains(&value) => {
            Err(ValidationError::WritingToneOutOfRange(value))
        }
        _ => Ok(()),
    }
}

fn validate_chapters(chapters: &[ChapterInput]) -> Result<Vec<NewChapter>, ValidationError> {
    chapters
        .iter()
        .map(|chapter| {
            if chapter.number <= 0 {
                return Err(ValidationError::ChapterNumberNotPositive(chapter.number));
            }
            if chapter.title.is_empty() {
                return Err(ValidationError::EmptyChapterTitle(chapter.number));
            }
            Ok(NewChapter {
                number: chapter.number,
                title: chapter.title.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
