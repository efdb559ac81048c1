use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shared::{
    domain::BookId,
    protocol::UpdateBookRequest,
    validation::validate_update,
};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/books.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    ListBooks,
    ShowBook { book_id: i64 },
    RenameBook { book_id: i64, title: String },
    DeleteBook { book_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::ListBooks => {
            for book in storage.list_books().await? {
                println!(
                    "{}\t{}\t{}\t{} chapters",
                    book.id,
                    book.book_type,
                    book.title,
                    book.chapters.len()
                );
            }
        }
        Command::ShowBook { book_id } => {
            let Some(book) = storage.get_book(BookId(book_id)).await? else {
                bail!("book {book_id} not found");
            };
            println!("{}", serde_json::to_string_pretty(&book)?);
        }
        Command::RenameBook { book_id, title } => {
            let changes = validate_update(&UpdateBookRequest {
                title,
                ..UpdateBookRequest::default()
            })?;
            if !storage.update_book(BookId(book_id), &changes).await? {
                bail!("book {book_id} not found");
            }
            println!("renamed book_id={book_id}");
        }
        Command::DeleteBook { book_id } => {
            if !storage.delete_book(BookId(book_id)).await? {
                bail!("book {book_id} not found");
            }
            println!("deleted book_id={book_id}");
        }
    }

    Ok(())
}
