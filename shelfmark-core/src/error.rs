//! Error types for the library store, imports and the offline cache.

use thiserror::Error;

use crate::model::EntryId;

/// Input rejected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("author must not be empty")]
    EmptyAuthor,

    #[error("annotation text must not be empty")]
    EmptyText,

    #[error("book id {0} appears more than once")]
    DuplicateBookId(EntryId),

    #[error("annotation id {annotation} appears more than once in book {book}")]
    DuplicateAnnotationId { book: EntryId, annotation: EntryId },
}

/// Failure of the persistence substrate.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backends that only report a message (browser storage, for one).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A library document that could not be imported.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("expected a JSON array of books")]
    NotAnArray,

    #[error("records do not match the book layout: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Errors surfaced by [`crate::store::Library`].
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("could not persist library: {0}")]
    Store(#[from] StoreError),

    /// The persisted document exists but cannot be read back.
    #[error("stored library under key {key:?} is unreadable: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not serialize library: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl LibraryError {
    /// Short notice suitable for a status line or alert.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LibraryError::Validation(err) => err.to_string(),
            LibraryError::Import(ImportError::Parse(_)) => "Could not read the JSON file.".into(),
            LibraryError::Import(ImportError::NotAnArray)
            | LibraryError::Import(ImportError::Shape(_)) => "Invalid JSON file.".into(),
            LibraryError::Store(_) | LibraryError::Serialize(_) => {
                "Saving failed; changes may be lost.".into()
            }
            LibraryError::Corrupt { .. } => "Stored library is unreadable.".into(),
        }
    }
}

/// Errors from the offline cache policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("network request for {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("cache storage failed: {0}")]
    Storage(String),

    #[error("{url} answered with status {status}")]
    BadStatus { url: String, status: u16 },

    /// Network failed and no cached copy or app shell was available.
    #[error("{url} is unavailable offline")]
    Unavailable { url: String },
}
