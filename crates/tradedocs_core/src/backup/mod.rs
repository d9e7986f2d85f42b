//! Backup envelope format and snapshot import/export.
//!
//! # Responsibility
//! - Define the `.dsp`/`.json` envelope shared by file export, import and
//!   WebDAV backup.
//! - Implement full-overwrite and smart-merge import over the document
//!   store.
//!
//! # Invariants
//! - `.dsp` and `.json` carry the same JSON body; import sniffs content,
//!   never file names.
//! - Merge import is idempotent: re-importing a snapshot reports zero
//!   added and zero updated records.

pub mod envelope;
pub mod import;

pub use envelope::{BackupEnvelope, BackupMeta, BACKUP_APP_ID, BACKUP_SCHEMA_VERSION};
pub use import::{CollectionReport, ImportError, ImportMode, ImportReport};
