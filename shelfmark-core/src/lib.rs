//! Shelfmark Core - Platform-agnostic reading notebook library
//!
//! This crate provides the catalog model, its persistence, the annotation
//! queries and progress track, the per-book document layout, and the
//! offline caching rules used by the web build. It's designed to work both
//! in the native CLI and in WASM environments.

pub mod app;
pub mod cache;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod progress;
pub mod query;
pub mod store;

pub use app::{
    AnnotationField, AnnotationForm, App, BookField, BookForm, InputTarget, Mode, Screen,
};
pub use error::{CacheError, ImportError, LibraryError, StoreError, ValidationError};
pub use export::{parse_catalog, to_json, EXPORT_FILE_NAME};
pub use layout::{layout_book, DocumentLayout, LayoutPage, PlacedText, TextStyle};
pub use model::{
    parse_number_prefix, Annotation, AnnotationDraft, AnnotationKind, Book, BookDraft, Catalog,
    EntryId,
};
pub use progress::{project, project_book, Marker, ProgressTrack};
pub use query::{
    query_annotations, search_books, AnnotationFilter, AnnotationStats, AnnotationView, BookQuery,
    SortKey, StatFilter,
};
pub use store::{KeyValueStore, Library, MemoryStore, LIBRARY_KEY};
