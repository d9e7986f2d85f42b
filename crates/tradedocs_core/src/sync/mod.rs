//! Remote backup transport.
//!
//! # Responsibility
//! - Define the remote-store contract used by backup/restore services.
//! - Provide the WebDAV implementation.
//!
//! # Invariants
//! - Transport and HTTP-status failures map into [`SyncError`] without
//!   automatic retry; only the local database handle gets retry handling.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod webdav;

pub use webdav::{WebDavClient, WebDavConfig};

pub type SyncResult<T> = Result<T, SyncError>;

/// Remote backup failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Config rejected before any request was made.
    InvalidConfig(String),
    /// Server answered with a non-success status.
    Http { status: u16, context: String },
    /// Request never produced an HTTP response.
    Transport(String),
    /// Requested backup file does not exist remotely.
    BackupNotFound(String),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig(message) => write!(f, "invalid sync config: {message}"),
            Self::Http { status, context } => {
                write!(f, "remote returned http status {status} during {context}")
            }
            Self::Transport(message) => write!(f, "remote transport error: {message}"),
            Self::BackupNotFound(name) => write!(f, "remote backup not found: {name}"),
        }
    }
}

impl Error for SyncError {}

/// Contract for a store that holds backup snapshots remotely.
///
/// Implemented by [`WebDavClient`]; tests substitute in-memory fakes.
pub trait RemoteBackupStore {
    /// Creates the remote backup directory when missing.
    fn ensure_remote_dir(&self) -> SyncResult<()>;
    /// Writes one backup file, overwriting an existing one of the same name.
    fn upload(&self, file_name: &str, body: &str) -> SyncResult<()>;
    /// Lists backup file names, newest-named first.
    fn list_backups(&self) -> SyncResult<Vec<String>>;
    /// Reads one backup file body.
    fn download(&self, file_name: &str) -> SyncResult<String>;
}

/// Default name for a new backup file.
///
/// The epoch-millisecond stamp keeps plain lexicographic-by-length-then-value
/// ordering aligned with recency for names produced by this crate.
pub fn default_backup_file_name(exported_at_ms: i64) -> String {
    format!("tradedocs-backup-{exported_at_ms}.dsp")
}
