//! Catalog persistence.
//!
//! The whole catalog is serialized to one JSON document under a fixed key
//! and rewritten after every mutation. [`Library`] is the only place the
//! catalog is changed; everything else reads it.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{LibraryError, StoreError};
use crate::export;
use crate::model::{Annotation, AnnotationDraft, Book, BookDraft, Catalog, EntryId};

/// Key under which the catalog document is stored
pub const LIBRARY_KEY: &str = "library";

/// Get/set by key persistence substrate
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store, used by tests and throwaway sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), value.to_string());
        store
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The catalog together with the store it is persisted to
#[derive(Debug)]
pub struct Library<S> {
    store: S,
    key: String,
    catalog: Catalog,
}

impl<S: KeyValueStore> Library<S> {
    /// Load the catalog stored under [`LIBRARY_KEY`]; absent means empty
    pub fn load(store: S) -> Result<Self, LibraryError> {
        Self::load_with_key(store, LIBRARY_KEY)
    }

    pub fn load_with_key(store: S, key: impl Into<String>) -> Result<Self, LibraryError> {
        let key = key.into();
        let catalog = match store.get(&key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|source| LibraryError::Corrupt {
                    key: key.clone(),
                    source,
                })?,
            None => Catalog::default(),
        };
        debug!(key = %key, books = catalog.len(), "library loaded");
        Ok(Self {
            store,
            key,
            catalog,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn book(&self, id: &EntryId) -> Option<&Book> {
        self.catalog.book(id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn add_book(&mut self, draft: BookDraft) -> Result<EntryId, LibraryError> {
        let book = Book::new(draft.validate()?);
        let id = book.id.clone();
        self.update(|catalog| {
            catalog.push(book);
            Some(())
        })?;
        Ok(id)
    }

    /// Returns `false` when the book no longer exists
    pub fn edit_book(&mut self, id: &EntryId, draft: BookDraft) -> Result<bool, LibraryError> {
        let valid = draft.validate()?;
        let changed = self.update(|catalog| {
            catalog.book_mut(id).map(|book| book.apply(valid))
        })?;
        Ok(changed.is_some())
    }

    /// Delete a book and all of its annotations
    pub fn delete_book(&mut self, id: &EntryId) -> Result<Option<Book>, LibraryError> {
        self.update(|catalog| catalog.remove(id))
    }

    /// Returns the new annotation's id, or `None` when the book is gone
    pub fn add_annotation(
        &mut self,
        book_id: &EntryId,
        draft: AnnotationDraft,
    ) -> Result<Option<EntryId>, LibraryError> {
        let annotation = Annotation::new(draft.validate()?);
        let id = annotation.id.clone();
        let added = self.update(|catalog| {
            catalog
                .book_mut(book_id)
                .map(|book| book.add_annotation(annotation))
        })?;
        Ok(added.map(|()| id))
    }

    pub fn edit_annotation(
        &mut self,
        book_id: &EntryId,
        annotation_id: &EntryId,
        draft: AnnotationDraft,
    ) -> Result<bool, LibraryError> {
        let valid = draft.validate()?;
        let changed = self.update(|catalog| {
            let book = catalog.book_mut(book_id)?;
            book.annotation_mut(annotation_id)?.apply(valid);
            book.touch();
            Some(())
        })?;
        Ok(changed.is_some())
    }

    pub fn delete_annotation(
        &mut self,
        book_id: &EntryId,
        annotation_id: &EntryId,
    ) -> Result<Option<Annotation>, LibraryError> {
        self.update(|catalog| catalog.book_mut(book_id)?.remove_annotation(annotation_id))
    }

    /// Replace the whole catalog with an imported document.
    ///
    /// The current catalog is untouched unless the document parses, is an
    /// array of books and keeps identifiers unique. Returns the book count.
    pub fn import_json(&mut self, json: &str) -> Result<usize, LibraryError> {
        let catalog = export::parse_catalog(json)?;
        let count = catalog.len();
        self.replace_catalog(catalog)?;
        Ok(count)
    }

    pub fn replace_catalog(&mut self, catalog: Catalog) -> Result<(), LibraryError> {
        catalog.check_ids()?;
        self.update(move |current| {
            *current = catalog;
            Some(())
        })?;
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, LibraryError> {
        export::to_json(&self.catalog).map_err(LibraryError::Serialize)
    }

    /// Single mutation entry point: apply `f` to a copy, persist it, then
    /// commit. A failed save leaves the in-memory catalog as it was.
    fn update<T>(
        &mut self,
        f: impl FnOnce(&mut Catalog) -> Option<T>,
    ) -> Result<Option<T>, LibraryError> {
        let mut next = self.catalog.clone();
        let Some(out) = f(&mut next) else {
            debug!("target no longer exists, nothing to persist");
            return Ok(None);
        };
        self.persist(&next)?;
        self.catalog = next;
        Ok(Some(out))
    }

    fn persist(&mut self, catalog: &Catalog) -> Result<(), LibraryError> {
        let json = serde_json::to_string(catalog).map_err(LibraryError::Serialize)?;
        self.store.set(&self.key, &json)?;
        debug!(
            books = catalog.len(),
            annotations = catalog.annotation_count(),
            "library persisted"
        );
        Ok(())
    }
}
