use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Book, BookId},
    error::ApiError,
    protocol::{
        book_route, books_route, BookListResponse, BookResponse, CreateBookRequest,
        CreateBookResponse, MessageResponse, UpdateBookRequest,
    },
};
use tracing::{info, warn};
use url::Url;

pub mod error;
mod saver;

pub use error::ClientError;
pub use saver::{SaveError, SaveStatus, WizardSaver};

/// Somewhere a finished wizard record can be stored.
#[async_trait]
pub trait BookSink: Send + Sync {
    async fn create_book(&self, request: &CreateBookRequest) -> Result<BookId>;
}

/// HTTP client for the book persistence API.
#[derive(Debug, Clone)]
pub struct BooksClient {
    http: Client,
    server_url: Url,
}

impl BooksClient {
    /// `server_url` may carry a path prefix (`http://host/wizard`); routes
    /// are resolved below it.
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let mut parsed = Url::parse(server_url).map_err(|source| ClientError::InvalidUrl {
            url: server_url.to_string(),
            source,
        })?;
        if !parsed.path().ends_with('/') {
            let prefix = format!("{}/", parsed.path());
            parsed.set_path(&prefix);
        }
        Ok(Self {
            http: Client::new(),
            server_url: parsed,
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    pub async fn health(&self) -> Result<(), ClientError> {
        self.http
            .get(self.endpoint("/healthz")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn create_book(&self, request: &CreateBookRequest) -> Result<BookId, ClientError> {
        let response = self
            .http
            .post(self.endpoint(books_route())?)
            .json(request)
            .send()
            .await?;
        let created: CreateBookResponse = decode(response).await?;
        info!(book_id = %created.book_id, title = %request.title, "book saved");
        Ok(created.book_id)
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, ClientError> {
        let response = self.http.get(self.endpoint(books_route())?).send().await?;
        let listed: BookListResponse = decode(response).await?;
        Ok(listed.books)
    }

    pub async fn get_book(&self, book_id: BookId) -> Result<Book, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&book_route(book_id))?)
            .send()
            .await?;
        let fetched: BookResponse = decode(response).await?;
        Ok(fetched.book)
    }

    /// Chapters in `request`, when present, replace the whole stored list.
    pub async fn update_book(
        &self,
        book_id: BookId,
        request: &UpdateBookRequest,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .put(self.endpoint(&book_route(book_id))?)
            .json(request)
            .send()
            .await?;
        let _: MessageResponse = decode(response).await?;
        Ok(())
    }

    pub async fn delete_book(&self, book_id: BookId) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint(&book_route(book_id))?)
            .send()
            .await?;
        let _: MessageResponse = decode(response).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.server_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ClientError::InvalidUrl {
                url: format!("{}{path}", self.server_url),
                source,
            })
    }
}

#[async_trait]
impl BookSink for BooksClient {
    async fn create_book(&self, request: &CreateBookRequest) -> Result<BookId> {
        Ok(BooksClient::create_book(self, request).await?)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await?;
    let message = match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => api_error.message,
        Err(_) => body,
    };
    warn!(status = status.as_u16(), %message, "server rejected request");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
