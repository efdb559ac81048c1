use shared::domain::BookId;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use wizard::{export::book_request, WizardSession};

use crate::BookSink;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved(BookId),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("the wizard is not finished yet")]
    Incomplete,
    #[error("a save is already in progress")]
    InFlight,
    #[error("this book is already saved as #{0}")]
    AlreadySaved(BookId),
    #[error("failed to save book: {0}")]
    Sink(String),
}

/// Sends a finished session to a [`BookSink`] and remembers how the last
/// attempt went. The session itself is only read.
pub struct WizardSaver<S> {
    sink: S,
    status: Mutex<SaveStatus>,
}

impl<S: BookSink> WizardSaver<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            status: Mutex::new(SaveStatus::Idle),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn status(&self) -> SaveStatus {
        self.status.lock().await.clone()
    }

    pub async fn is_saving(&self) -> bool {
        *self.status.lock().await == SaveStatus::Saving
    }

    /// Forgets the last outcome so a new book can be saved.
    pub async fn reset(&self) {
        *self.status.lock().await = SaveStatus::Idle;
    }

    /// Stores the session's book record once. After a failure, calling again
    /// retries with the same record; after a success it is refused until
    /// [`WizardSaver::reset`].
    pub async fn save(&self, session: &WizardSession) -> Result<BookId, SaveError> {
        if !session.is_complete() {
            return Err(SaveError::Incomplete);
        }
        {
            let mut status = self.status.lock().await;
            match *status {
                SaveStatus::Saving => return Err(SaveError::InFlight),
                SaveStatus::Saved(book_id) => return Err(SaveError::AlreadySaved(book_id)),
                SaveStatus::Idle | SaveStatus::Failed(_) => *status = SaveStatus::Saving,
            }
        }
        let mut pending = PendingSave {
            status: &self.status,
            settled: false,
        };

        let request = book_request(session);
        let result = self.sink.create_book(&request).await;

        pending.settled = true;
        let mut status = self.status.lock().await;
        match result {
            Ok(book_id) => {
                info!(%book_id, "wizard record saved");
                *status = SaveStatus::Saved(book_id);
                Ok(book_id)
            }
            Err(err) => {
                let message = format!("{err:#}");
                error!(%message, "saving wizard record failed");
                *status = SaveStatus::Failed(message.clone());
                Err(SaveError::Sink(message))
            }
        }
    }
}

/// Puts the status back to `Idle` when a save future is dropped before the
/// sink answered.
struct PendingSave<'a> {
    status: &'a Mutex<SaveStatus>,
    settled: bool,
}

impl Drop for PendingSave<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Ok(mut status) = self.status.try_lock() {
            if *status == SaveStatus::Saving {
                warn!("save abandoned before the sink answered");
                *status = SaveStatus::Idle;
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/saver_tests.rs"]
mod tests;
