use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Book, EntryId};
use crate::error::ValidationError;

/// Every book in the library; persisted as one JSON array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn book(&self, id: &EntryId) -> Option<&Book> {
        self.books.iter().find(|b| &b.id == id)
    }

    pub fn book_mut(&mut self, id: &EntryId) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| &b.id == id)
    }

    pub fn push(&mut self, book: Book) {
        self.books.push(book);
    }

    /// Remove a book and, with it, all of its annotations
    pub fn remove(&mut self, id: &EntryId) -> Option<Book> {
        let pos = self.books.iter().position(|b| &b.id == id)?;
        Some(self.books.remove(pos))
    }

    pub fn annotation_count(&self) -> usize {
        self.books.iter().map(|b| b.annotations.len()).sum()
    }

    /// Book ids unique in the catalog, annotation ids unique per book
    pub fn check_ids(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for book in &self.books {
            if !seen.insert(&book.id) {
                return Err(ValidationError::DuplicateBookId(book.id.clone()));
            }
            book.check_annotation_ids()?;
        }
        Ok(())
    }
}
