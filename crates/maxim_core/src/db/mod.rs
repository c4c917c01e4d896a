//! SQLite storage bootstrap for the key-value backend.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the journal core.
//! - Ensure the `kv_store` table exists before any read or write.
//!
//! # Invariants
//! - Layout version is tracked via `PRAGMA user_version`.
//! - Databases written by a newer layout are rejected, never rewritten.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::{open_db, open_db_in_memory, KV_LAYOUT_VERSION};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedLayoutVersion { db_version: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedLayoutVersion {
                db_version,
                supported,
            } => write!(
                f,
                "database layout version {db_version} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedLayoutVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
