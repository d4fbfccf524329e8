//! Offline asset caching for the web build's service worker.
//!
//! The browser specifics (Cache API, `fetch`) live behind [`Network`] and
//! [`CacheStore`] so the serving rules can run and be tested anywhere.

pub mod policy;
pub mod types;

pub use policy::{CachePolicy, CacheStore, Network};
pub use types::{
    CacheConfig, Request, RequestMode, Response, ResponseKind, DEFAULT_APP_SHELL, DEFAULT_ASSETS,
    DEFAULT_CACHE_NAME,
};
