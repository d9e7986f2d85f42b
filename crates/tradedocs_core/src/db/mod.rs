//! SQLite storage bootstrap, schema migration and connection recovery.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the document store.
//! - Apply schema migrations in deterministic order.
//! - Recover a file-backed connection once when the handle reports itself
//!   unusable mid-operation.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Application data is never touched before migrations succeed.
//! - Memory-backed storage never retries: reopening `:memory:` would
//!   silently discard all data.

use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Where a [`Storage`] connection came from, used for recovery decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
enum StorageOrigin {
    File(PathBuf),
    Memory,
}

/// Owned connection handle with single-shot reconnect recovery.
///
/// Repositories borrow the raw connection through [`Storage::run`]; when an
/// operation fails because the handle itself went bad (closed, locked,
/// cannot-open class failures) and the database is file-backed, the handle
/// is reopened from its path and the operation is re-run exactly once.
pub struct Storage {
    origin: StorageOrigin,
    conn: Connection,
}

impl Storage {
    /// Opens file-backed storage with migrations applied.
    pub fn open_file(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        let conn = open_db(&path)?;
        Ok(Self {
            origin: StorageOrigin::File(path),
            conn,
        })
    }

    /// Opens memory-backed storage with migrations applied.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = open_db_in_memory()?;
        Ok(Self {
            origin: StorageOrigin::Memory,
            conn,
        })
    }

    /// Borrows the live connection without recovery semantics.
    pub fn connection(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Runs `op` against the connection, retrying once after a reconnect
    /// when the failure looks like a dead handle rather than a data error.
    pub fn run<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        E: RetryableError,
        F: Fn(&mut Connection) -> Result<T, E>,
    {
        match op(&mut self.conn) {
            Ok(value) => Ok(value),
            Err(err) => {
                if !err.is_connection_failure() {
                    return Err(err);
                }
                let StorageOrigin::File(path) = &self.origin else {
                    warn!(
                        "event=storage_retry module=db status=skipped reason=memory_backed"
                    );
                    return Err(err);
                };
                match open_db(path) {
                    Ok(fresh) => {
                        info!("event=storage_retry module=db status=reopened");
                        self.conn = fresh;
                        op(&mut self.conn)
                    }
                    Err(reopen_err) => {
                        warn!(
                            "event=storage_retry module=db status=reopen_failed error={reopen_err}"
                        );
                        Err(err)
                    }
                }
            }
        }
    }
}

/// Retry classification seam for [`Storage::run`].
///
/// Layered errors (repo, backup) expose their database cause through this
/// trait so the reconnect decision stays in one place.
pub trait RetryableError {
    /// Whether the failure indicates a dead connection handle rather than
    /// a data-level error.
    fn is_connection_failure(&self) -> bool;
}

impl RetryableError for DbError {
    fn is_connection_failure(&self) -> bool {
        let Self::Sqlite(sqlite_err) = self else {
            return false;
        };
        match sqlite_err {
            rusqlite::Error::SqliteFailure(code, _) => matches!(
                code.code,
                rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
                    | rusqlite::ErrorCode::NotADatabase
            ),
            _ => false,
        }
    }
}
