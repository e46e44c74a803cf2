//! SQL schema for the SQLite document store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document. `seq` preserves insertion order for unordered reads.
CREATE TABLE IF NOT EXISTS documents (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    collection  TEXT NOT NULL,   -- 'contacts' | 'departments' | 'institutes' | 'units'
    doc_id      TEXT NOT NULL,
    data        TEXT NOT NULL,   -- JSON object of top-level fields
    UNIQUE (collection, doc_id),
    CHECK  (json_valid(data))
);

CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents(collection);

PRAGMA user_version = 1;
";
