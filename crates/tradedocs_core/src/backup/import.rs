//! Snapshot import: envelope validation, replace and smart merge.

use crate::backup::envelope::{BackupEnvelope, BACKUP_APP_ID, BACKUP_SCHEMA_VERSION};
use crate::db::RetryableError;
use crate::repo::doc_store::{
    Collection, DocumentRecord, MergeOutcome, RepoError, SqliteDocStore,
};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How an incoming snapshot is applied to the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Overwrite every collection wholesale with envelope contents.
    Replace,
    /// Smart merge: insert new ids, keep the newer of conflicting records.
    Merge,
}

/// Import failure taxonomy surfaced to the caller.
#[derive(Debug)]
pub enum ImportError {
    /// Input is not a parseable envelope.
    Malformed(serde_json::Error),
    /// `meta.app` named a different producer.
    ForeignApp(String),
    /// Envelope schema is newer than this binary understands.
    UnsupportedSchema { found: u32, supported: u32 },
    Repo(RepoError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "backup file is not valid: {err}"),
            Self::ForeignApp(app) => {
                write!(f, "backup file was produced by `{app}`, expected `{BACKUP_APP_ID}`")
            }
            Self::UnsupportedSchema { found, supported } => write!(
                f,
                "backup schema {found} is newer than supported {supported}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl RetryableError for ImportError {
    fn is_connection_failure(&self) -> bool {
        match self {
            Self::Repo(err) => err.is_connection_failure(),
            _ => false,
        }
    }
}

/// Per-collection merge counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub added: u32,
    pub updated: u32,
    pub skipped: u32,
}

impl CollectionReport {
    fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Added => self.added += 1,
            MergeOutcome::Updated => self.updated += 1,
            MergeOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Outcome counters of one import, keyed by collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub projects: CollectionReport,
    pub sellers: CollectionReport,
    pub consignees: CollectionReport,
    pub presets: CollectionReport,
    pub knowledge_base: CollectionReport,
}

impl ImportReport {
    pub fn collection(&self, collection: Collection) -> &CollectionReport {
        match collection {
            Collection::Projects => &self.projects,
            Collection::Sellers => &self.sellers,
            Collection::Consignees => &self.consignees,
            Collection::Presets => &self.presets,
            Collection::KnowledgeBase => &self.knowledge_base,
        }
    }

    pub fn total_added(&self) -> u32 {
        self.all().iter().map(|report| report.added).sum()
    }

    pub fn total_updated(&self) -> u32 {
        self.all().iter().map(|report| report.updated).sum()
    }

    pub fn total_skipped(&self) -> u32 {
        self.all().iter().map(|report| report.skipped).sum()
    }

    fn all(&self) -> [CollectionReport; 5] {
        [
            self.projects,
            self.sellers,
            self.consignees,
            self.presets,
            self.knowledge_base,
        ]
    }
}

/// Parses and validates envelope text (`.dsp` or `.json`, same body).
pub fn parse_envelope(text: &str) -> Result<BackupEnvelope, ImportError> {
    let envelope: BackupEnvelope =
        serde_json::from_str(text).map_err(ImportError::Malformed)?;
    if envelope.meta.app != BACKUP_APP_ID {
        return Err(ImportError::ForeignApp(envelope.meta.app));
    }
    if envelope.meta.schema > BACKUP_SCHEMA_VERSION {
        return Err(ImportError::UnsupportedSchema {
            found: envelope.meta.schema,
            supported: BACKUP_SCHEMA_VERSION,
        });
    }
    Ok(envelope)
}

/// Applies an already-parsed envelope to the store.
///
/// Every record is validated before the first write, so a bad record
/// rejects the whole envelope instead of leaving collections half
/// replaced.
pub fn apply_envelope(
    conn: &mut Connection,
    envelope: &BackupEnvelope,
    mode: ImportMode,
) -> Result<ImportReport, ImportError> {
    validate_envelope(envelope)?;
    match mode {
        ImportMode::Replace => replace_collections(conn, envelope),
        ImportMode::Merge => merge_collections(conn, envelope),
    }
}

fn validate_envelope(envelope: &BackupEnvelope) -> Result<(), ImportError> {
    validate_records(&envelope.projects)?;
    validate_records(&envelope.sellers)?;
    validate_records(&envelope.consignees)?;
    validate_records(&envelope.presets)?;
    validate_records(&envelope.knowledge_base)
}

fn validate_records<T: DocumentRecord>(records: &[T]) -> Result<(), ImportError> {
    for record in records {
        record
            .validate()
            .map_err(|err| ImportError::Repo(RepoError::Validation(err)))?;
    }
    Ok(())
}

fn replace_collections(
    conn: &mut Connection,
    envelope: &BackupEnvelope,
) -> Result<ImportReport, ImportError> {
    let mut store = SqliteDocStore::new(conn);
    let mut report = ImportReport::default();

    store.replace_all(&envelope.projects)?;
    report.projects.added = envelope.projects.len() as u32;
    store.replace_all(&envelope.sellers)?;
    report.sellers.added = envelope.sellers.len() as u32;
    store.replace_all(&envelope.consignees)?;
    report.consignees.added = envelope.consignees.len() as u32;
    store.replace_all(&envelope.presets)?;
    report.presets.added = envelope.presets.len() as u32;
    store.replace_all(&envelope.knowledge_base)?;
    report.knowledge_base.added = envelope.knowledge_base.len() as u32;

    Ok(report)
}

fn merge_collections(
    conn: &mut Connection,
    envelope: &BackupEnvelope,
) -> Result<ImportReport, ImportError> {
    let mut store = SqliteDocStore::new(conn);
    let mut report = ImportReport::default();

    merge_records(&mut store, &envelope.projects, &mut report.projects)?;
    merge_records(&mut store, &envelope.sellers, &mut report.sellers)?;
    merge_records(&mut store, &envelope.consignees, &mut report.consignees)?;
    merge_records(&mut store, &envelope.presets, &mut report.presets)?;
    merge_records(
        &mut store,
        &envelope.knowledge_base,
        &mut report.knowledge_base,
    )?;

    Ok(report)
}

fn merge_records<T: DocumentRecord>(
    store: &mut SqliteDocStore<'_>,
    records: &[T],
    report: &mut CollectionReport,
) -> Result<(), ImportError> {
    for record in records {
        report.record(store.upsert_if_newer(record)?);
    }
    Ok(())
}
