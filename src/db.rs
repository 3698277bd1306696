//! SQLite helpers shared by the user and catalog stores

use anyhow::{Context, Result};
use rusqlite::{ffi, Connection};
use thiserror::Error;

/// Store-level failure. `Duplicate` is raised by the database's own UNIQUE
/// constraints, so concurrent inserts of the same key resolve to one winner.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists")]
    Duplicate,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        if is_unique_violation(&e) {
            StoreError::Duplicate
        } else {
            StoreError::Other(e.into())
        }
    }
}

pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
    match e {
        rusqlite::Error::SqliteFailure(err, _) => {
            err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

/// Open a file-backed connection tuned for a single-writer service
pub fn open(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path).with_context(|| format!("open db {db_path}"))?;
    conn.pragma_update(None, "journal_mode", "WAL").ok();
    conn.pragma_update(None, "synchronous", "NORMAL").ok();
    conn.pragma_update(None, "foreign_keys", "ON").ok();
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().context("open in-memory db")
}

/// Parse a TEXT column holding a UUID
pub fn uuid_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<uuid::Uuid> {
    let raw: String = row.get(idx)?;
    uuid::Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
