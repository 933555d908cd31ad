//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with a single table:
//! - urls(id, url, summary, created_at)

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, SqliteStore};
