use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(BookId);
id_newtype!(ChapterId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookType {
    Fiction,
    NonFiction,
}

impl BookType {
    pub const ALL: [BookType; 2] = [BookType::Fiction, BookType::NonFiction];

    pub fn as_str(self) -> &'static str {
        match self {
            BookType::Fiction => "fiction",
            BookType::NonFiction => "non-fiction",
        }
    }
}

impl fmt::Display for BookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown book type '{0}'")]
pub struct UnknownBookType(pub String);

impl FromStr for BookType {
    type Err = UnknownBookType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BookType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownBookType(value.to_string()))
    }
}

/// A persisted book row together with its chapters ordered by number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub book_type: BookType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writing_tone: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub book_id: BookId,
    pub chapter_number: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Book fields that passed validation and are ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub book_type: BookType,
    pub genre: Option<String>,
    pub category: Option<String>,
    pub target_audience: Option<String>,
    pub writing_tone: Option<i64>,
    pub themes: Option<Vec<String>>,
    pub chapters: Vec<NewChapter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChapter {
    pub number: i64,
    pub title: String,
}

/// Validated partial update. `None` leaves the stored value untouched; a
/// `Some` chapter list replaces every chapter of the book.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookChanges {
    pub title: String,
    pub book_type: Option<BookType>,
    pub genre: Option<String>,
    pub category: Option<String>,
    pub target_audience: Option<String>,
    pub writing_tone: Option<i64>,
    pub themes: Option<Vec<String>>,
    pub chapters: Option<Vec<NewChapter>>,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
