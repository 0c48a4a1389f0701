//! SQL schema for the snapshot store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per cached collection; a save replaces the whole payload.
CREATE TABLE IF NOT EXISTS snapshots (
    key         TEXT PRIMARY KEY,   -- e.g. 'entities', 'modules'
    stored_at   TEXT NOT NULL,      -- ISO 8601 UTC
    payload     TEXT NOT NULL       -- JSON document
);

PRAGMA user_version = 1;
";
