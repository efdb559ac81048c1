use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite, SqliteConnection,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{Book, BookChanges, BookId, BookType, Chapter, ChapterId, NewBook, NewChapter};

const BOOK_COLUMNS: &str = "id, title, book_type, genre, category, target_audience, writing_tone, themes, created_at, updated_at";
const CHAPTER_COLUMNS: &str = "id, book_id, chapter_number, title, created_at";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts the book and its chapters in one transaction.
    pub async fn create_book(&self, book: &NewBook) -> Result<BookId> {
        let now = Utc::now();
        let themes = encode_themes(book.themes.as_deref())?;
        let mut tx = self.pool.begin().await?;

        let rec = sqlx::query(
            "INSERT INTO books (title, book_type, genre, category, target_audience, writing_tone, themes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&book.title)
        .bind(book.book_type.as_str())
        .bind(book.genre.as_deref())
        .bind(book.category.as_deref())
        .bind(book.target_audience.as_deref())
        .bind(book.writing_tone)
        .bind(themes)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .context("failed to insert book")?;
        let book_id = BookId(rec.get::<i64, _>(0));

        insert_chapters(&mut tx, book_id, &book.chapters, now).await?;
        tx.commit().await?;
        Ok(book_id)
    }

    /// All books, newest first, each with its chapters.
    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let chapter_rows = sqlx::query(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters ORDER BY book_id, chapter_number, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        let mut chapters_by_book: HashMap<BookId, Vec<Chapter>> = HashMap::new();
        for row in &chapter_rows {
            let chapter = chapter_from_row(row);
            chapters_by_book
                .entry(chapter.book_id)
                .or_default()
                .push(chapter);
        }

        rows.iter()
            .map(|row| {
                let id = BookId(row.get::<i64, _>(0));
                book_from_row(row, chapters_by_book.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    pub async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
            .bind(book_id.0)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let chapters = self.list_chapters(book_id).await?;
        book_from_row(&row, chapters).map(Some)
    }

    /// Chapters of a book ordered by chapter number.
    pub async fn list_chapters(&self, book_id: BookId) -> Result<Vec<Chapter>> {
        let rows = sqlx::query(&format!(
            "SELECT {CHAPTER_COLUMNS} FROM chapters WHERE book_id = ? ORDER BY chapter_number, id"
        ))
        .bind(book_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(chapter_from_row).collect())
    }

    /// Applies `changes` to an existing book. Fields left as `None` keep their
    /// stored value; a chapter list replaces all chapters. Returns `false`
    /// when no book has that id.
    pub async fn update_book(&self, book_id: BookId, changes: &BookChanges) -> Result<bool> {
        let now = Utc::now();
        let themes = encode_themes(changes.themes.as_deref())?;
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE books SET
                title = ?,
                book_type = COALESCE(?, book_type),
                genre = COALESCE(?, genre),
                category = COALESCE(?, category),
                target_audience = COALESCE(?, target_audience),
                writing_tone = COALESCE(?, writing_tone),
                themes = COALESCE(?, themes),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&changes.title)
        .bind(changes.book_type.map(BookType::as_str))
        .bind(changes.genre.as_deref())
        .bind(changes.category.as_deref())
        .bind(changes.target_audience.as_deref())
        .bind(changes.writing_tone)
        .bind(themes)
        .bind(now)
        .bind(book_id.0)
        .execute(&mut *tx)
        .await
        .context("failed to update book")?
        .rows_affected();
        if updated == 0 {
            return Ok(false);
        }

        if let Some(chapters) = &changes.chapters {
            delete_chapters(&mut tx, book_id).await?;
            insert_chapters(&mut tx, book_id, chapters, now).await?;
        }
        tx.commit().await?;
        Ok(true)
    }

    /// Deletes every chapter of the book, then inserts `chapters`.
    pub async fn replace_chapters(&self, book_id: BookId, chapters: &[NewChapter]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        delete_chapters(&mut tx, book_id).await?;
        insert_chapters(&mut tx, book_id, chapters, Utc::now()).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Returns `false` when no book has that id.
    pub async fn delete_book(&self, book_id: BookId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        delete_chapters(&mut tx, book_id).await?;
        let deleted = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(book_id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }
}

async fn insert_chapters(
    conn: &mut SqliteConnection,
    book_id: BookId,
    chapters: &[NewChapter],
    created_at: DateTime<Utc>,
) -> Result<()> {
    for chapter in chapters {
        sqlx::query(
            "INSERT INTO chapters (book_id, chapter_number, title, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(book_id.0)
        .bind(chapter.number)
        .bind(&chapter.title)
        .bind(created_at)
        .execute(&mut *conn)
        .await
        .with_context(|| format!("failed to insert chapter {} of book {book_id}", chapter.number))?;
    }
    Ok(())
}

async fn delete_chapters(conn: &mut SqliteConnection, book_id: BookId) -> Result<u64> {
    let deleted = sqlx::query("DELETE FROM chapters WHERE book_id = ?")
        .bind(book_id.0)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(deleted)
}

fn encode_themes(themes: Option<&[String]>) -> Result<Option<String>> {
    themes
        .map(|themes| serde_json::to_string(themes).context("failed to encode themes"))
        .transpose()
}

fn book_from_row(r: &SqliteRow, chapters: Vec<Chapter>) -> Result<Book> {
    let raw_type = r.get::<String, _>(2);
    let book_type = BookType::from_str(&raw_type)
        .with_context(|| format!("stored book has invalid type '{raw_type}'"))?;
    let themes = r
        .get::<Option<String>, _>(7)
        .map(|raw| serde_json::from_str::<Vec<String>>(&raw))
        .transpose()
        .context("stored themes are not a JSON string array")?;

    Ok(Book {
        id: BookId(r.get::<i64, _>(0)),
        title: r.get::<String, _>(1),
        book_type,
        genre: r.get::<Option<String>, _>(3),
        category: r.get::<Option<String>, _>(4),
        target_audience: r.get::<Option<String>, _>(5),
        writing_tone: r.get::<Option<i64>, _>(6),
        themes,
        created_at: r.get::<DateTime<Utc>, _>(8),
        updated_at: r.get::<DateTime<Utc>, _>(9),
        chapters,
    })
}

fn chapter_from_row(r: &SqliteRow) -> Chapter {
    Chapter {
        id: ChapterId(r.get::<i64, _>(0)),
        book_id: BookId(r.get::<i64, _>(1)),
        chapter_number: r.get::<i64, _>(2),
        title: r.get::<String, _>(3),
        created_at: r.get::<DateTime<Utc>, _>(4),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(parent) = sqlite_path(database_url)
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
    else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(&parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(PathBuf::from(path))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
