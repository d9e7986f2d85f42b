//! Backup, import and remote round-trip orchestration.
//!
//! # Responsibility
//! - Export the local store into one envelope and apply imported ones.
//! - Drive the remote backup store for cloud backup and restore.
//!
//! # Invariants
//! - Import never partially applies a malformed envelope: validation runs
//!   before any write.
//! - Remote failures carry no local side effects.

use crate::backup::envelope::BackupEnvelope;
use crate::backup::import::{apply_envelope, parse_envelope, ImportError, ImportMode, ImportReport};
use crate::db::Storage;
use crate::repo::doc_store::{RepoResult, SqliteDocStore};
use crate::sync::{default_backup_file_name, RemoteBackupStore, SyncError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure taxonomy for backup/restore round trips.
#[derive(Debug)]
pub enum BackupError {
    Import(ImportError),
    Sync(SyncError),
    Encode(serde_json::Error),
    /// Remote listing came back empty during restore-latest.
    NoRemoteBackups,
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import(err) => write!(f, "{err}"),
            Self::Sync(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "backup serialization failed: {err}"),
            Self::NoRemoteBackups => write!(f, "no backups found on the remote store"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Import(err) => Some(err),
            Self::Sync(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::NoRemoteBackups => None,
        }
    }
}

impl From<ImportError> for BackupError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<SyncError> for BackupError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

/// Use-case wrapper for snapshot export/import and remote round trips.
pub struct BackupService<'s> {
    storage: &'s mut Storage,
}

impl<'s> BackupService<'s> {
    pub fn new(storage: &'s mut Storage) -> Self {
        Self { storage }
    }

    /// Reads every collection into one envelope with a fresh `exportedAt`.
    pub fn export_snapshot(&mut self) -> RepoResult<BackupEnvelope> {
        self.storage.run(|conn| {
            let mut store = SqliteDocStore::new(conn);
            let mut envelope = BackupEnvelope::empty();
            envelope.projects = store.list()?;
            envelope.sellers = store.list()?;
            envelope.consignees = store.list()?;
            envelope.presets = store.list()?;
            envelope.knowledge_base = store.list()?;
            Ok(envelope)
        })
    }

    /// Exports the store as pretty-printed envelope JSON.
    pub fn export_json(&mut self) -> Result<String, BackupError> {
        let envelope = self.export_snapshot().map_err(ImportError::Repo)?;
        serde_json::to_string_pretty(&envelope).map_err(BackupError::Encode)
    }

    /// Parses, validates and applies envelope text.
    pub fn import_text(
        &mut self,
        text: &str,
        mode: ImportMode,
    ) -> Result<ImportReport, ImportError> {
        let envelope = parse_envelope(text)?;
        self.import_envelope(&envelope, mode)
    }

    /// Applies an already-validated envelope.
    pub fn import_envelope(
        &mut self,
        envelope: &BackupEnvelope,
        mode: ImportMode,
    ) -> Result<ImportReport, ImportError> {
        let report = self
            .storage
            .run(|conn| apply_envelope(conn, envelope, mode))?;
        info!(
            "event=backup_import module=backup status=ok mode={mode:?} added={} updated={} skipped={}",
            report.total_added(),
            report.total_updated(),
            report.total_skipped()
        );
        Ok(report)
    }

    /// Exports the store and uploads it; returns the remote file name.
    pub fn backup_to_remote(
        &mut self,
        remote: &dyn RemoteBackupStore,
    ) -> Result<String, BackupError> {
        let envelope = self.export_snapshot().map_err(ImportError::Repo)?;
        let body = serde_json::to_string_pretty(&envelope).map_err(BackupError::Encode)?;
        let file_name = default_backup_file_name(envelope.meta.exported_at);

        remote.ensure_remote_dir()?;
        remote.upload(&file_name, &body)?;
        info!(
            "event=backup_remote module=backup status=ok file={file_name} records={}",
            envelope.record_count()
        );
        Ok(file_name)
    }

    /// Downloads one named backup and imports it.
    pub fn restore_from_remote(
        &mut self,
        remote: &dyn RemoteBackupStore,
        file_name: &str,
        mode: ImportMode,
    ) -> Result<ImportReport, BackupError> {
        let body = remote.download(file_name)?;
        Ok(self.import_text(&body, mode)?)
    }

    /// Restores the newest-named remote backup.
    pub fn restore_latest_from_remote(
        &mut self,
        remote: &dyn RemoteBackupStore,
        mode: ImportMode,
    ) -> Result<ImportReport, BackupError> {
        let names = remote.list_backups()?;
        let latest = names.first().ok_or(BackupError::NoRemoteBackups)?;
        self.restore_from_remote(remote, latest, mode)
    }
}
