//! Database schema definitions

/// SQL to create the urls table
///
/// `summary` is declared but never written; `created_at` is unix millis.
pub const CREATE_URLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS urls (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    summary TEXT,
    created_at INTEGER NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_urls_created ON urls(created_at)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_URLS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
