//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::schema;
use crate::record::{UrlId, UrlRecord};
use crate::{Error, Result};

const SELECT_URL_COLUMNS: &str = "SELECT id, url, summary, created_at FROM urls";

/// SQLite-backed storage for URL records.
///
/// One connection guarded by a mutex. Inserts run in an IMMEDIATE
/// transaction; everything else is a single statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL lets a second process write while a server holds the file open
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.busy_timeout(Duration::from_secs(5))?;

        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        tracing::debug!("Opened url store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn) };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== URL Operations ==========

    /// All records, most recently created first
    pub fn list_urls(&self) -> Result<Vec<UrlRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "{SELECT_URL_COLUMNS} ORDER BY created_at DESC, rowid DESC"
        ))?;

        let records = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Get a record by id
    pub fn get_url(&self, id: &UrlId) -> Result<Option<UrlRecord>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("{SELECT_URL_COLUMNS} WHERE id = ?1"),
            [id.to_string()],
            row_to_record,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Insert a new record, assigning its id and creation time.
    ///
    /// The creation time is always later than the newest stored record, so
    /// creation order is a strict total order. The read and the insert share
    /// one IMMEDIATE transaction, which holds the file's write lock against
    /// other connections.
    pub fn insert_url(&self, url: &str) -> Result<UrlRecord> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let newest: Option<i64> =
            tx.query_row("SELECT MAX(created_at) FROM urls", [], |row| row.get(0))?;
        let now = Utc::now().timestamp_millis();
        let created_ms = match newest {
            Some(newest) if newest >= now => newest + 1,
            _ => now,
        };
        let created_at =
            millis_to_datetime(created_ms).ok_or(Error::InvalidTimestamp(created_ms))?;

        let id = UrlId::generate();
        tx.execute(
            "INSERT INTO urls (id, url, created_at) VALUES (?1, ?2, ?3)",
            params![id.to_string(), url, created_ms],
        )?;
        tx.commit()?;

        Ok(UrlRecord {
            id,
            url: url.to_string(),
            summary: None,
            created_at,
        })
    }

    /// Delete a record by id; fails with `UrlNotFound` if it does not exist
    pub fn delete_url(&self, id: &UrlId) -> Result<()> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM urls WHERE id = ?1", [id.to_string()])?;
        if deleted == 0 {
            return Err(Error::UrlNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Count all records
    pub fn count_urls(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM urls", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// SQLite's `data_version`: changes whenever *another* connection
    /// commits to the same database file.
    pub fn data_version(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let version = conn.query_row("PRAGMA data_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            urls: self.count_urls()?,
        })
    }
}

fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<UrlRecord> {
    let id_str: String = row.get(0)?;
    let id = UrlId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let created_ms: i64 = row.get(3)?;
    let created_at = millis_to_datetime(created_ms)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, created_ms))?;

    Ok(UrlRecord {
        id,
        url: row.get(1)?,
        summary: row.get(2)?,
        created_at,
    })
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct DbStats {
    pub urls: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        write!(f, "  URLs: {}", self.urls)
    }
}
