//! # urlshelf - URL Summarizer
//!
//! A minimal bookmarking utility: submit a URL, see it in a live-updating
//! list, delete it again.
//!
//! urlshelf provides:
//! - A SQLite-backed single-table store with store-assigned ids and timestamps
//! - Three data access operations (list, add, delete)
//! - A change feed that re-evaluates live list queries on every commit
//! - A server-rendered web view kept current over Server-Sent Events

pub mod record;
pub mod storage;
pub mod live;
pub mod service;
pub mod view;
pub mod server;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use record::{UrlId, UrlRecord};
pub use storage::SqliteStore;
pub use live::{Change, ChangeFeed, LiveUrls};
pub use service::{UrlOperations, UrlService};

/// Result type alias for urlshelf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for urlshelf operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL not found: {0}")]
    UrlNotFound(String),

    #[error("Invalid URL id: {0}")]
    InvalidId(String),

    #[error("Creation time out of range: {0} ms")]
    InvalidTimestamp(i64),
}
