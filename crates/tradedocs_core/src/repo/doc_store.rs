//! Collection-table document store over SQLite.
//!
//! # Responsibility
//! - Persist whole serde documents into `(id, updated_at, doc)` tables.
//! - Provide the merge-import primitive (`upsert_if_newer`) and the
//!   full-collection overwrite (`replace_all`).
//!
//! # Invariants
//! - `id` and `updated_at` columns always mirror the embedded document
//!   fields; the document body is authoritative.
//! - `upsert_if_newer` overwrites only strictly newer incoming records, so
//!   re-importing a snapshot is a no-op.

use crate::db::{DbError, RetryableError};
use crate::model::partner::{Consignee, Seller};
use crate::model::preset::{KnowledgeEntry, Preset};
use crate::model::project::Project;
use crate::model::ValidationError;
use rusqlite::{params, Connection, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound {
        collection: Collection,
        id: String,
    },
    InvalidDoc {
        collection: Collection,
        message: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "{} document not found: {id}", collection.key())
            }
            Self::InvalidDoc {
                collection,
                message,
            } => write!(
                f,
                "invalid persisted {} document: {message}",
                collection.key()
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidDoc { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RetryableError for RepoError {
    fn is_connection_failure(&self) -> bool {
        match self {
            Self::Db(err) => err.is_connection_failure(),
            _ => false,
        }
    }
}

/// The five persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Projects,
    Sellers,
    Consignees,
    Presets,
    KnowledgeBase,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Projects,
        Collection::Sellers,
        Collection::Consignees,
        Collection::Presets,
        Collection::KnowledgeBase,
    ];

    /// SQL table backing the collection.
    pub fn table(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Sellers => "sellers",
            Self::Consignees => "consignees",
            Self::Presets => "presets",
            Self::KnowledgeBase => "knowledge_entries",
        }
    }

    /// Envelope key of the collection, matching the backup format.
    pub fn key(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Sellers => "sellers",
            Self::Consignees => "consignees",
            Self::Presets => "presets",
            Self::KnowledgeBase => "knowledgeBase",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Outcome of one [`SqliteDocStore::upsert_if_newer`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Id was absent; the record was inserted.
    Added,
    /// Incoming record was strictly newer; the stored one was overwritten.
    Updated,
    /// Incoming record was same age or older; nothing changed.
    Skipped,
}

/// Contract binding a record type to its collection.
pub trait DocumentRecord: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn updated_at(&self) -> i64;
    /// Bumps `updated_at` to now; called by services on wholesale saves.
    fn touch(&mut self);
    fn validate(&self) -> Result<(), ValidationError>;
}

impl DocumentRecord for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn touch(&mut self) {
        Project::touch(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Project::validate(self)
    }
}

impl DocumentRecord for Seller {
    const COLLECTION: Collection = Collection::Sellers;

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn touch(&mut self) {
        Seller::touch(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Seller::validate(self)
    }
}

impl DocumentRecord for Consignee {
    const COLLECTION: Collection = Collection::Consignees;

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn touch(&mut self) {
        Consignee::touch(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Consignee::validate(self)
    }
}

impl DocumentRecord for Preset {
    const COLLECTION: Collection = Collection::Presets;

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn touch(&mut self) {
        Preset::touch(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Preset::validate(self)
    }
}

impl DocumentRecord for KnowledgeEntry {
    const COLLECTION: Collection = Collection::KnowledgeBase;

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn touch(&mut self) {
        KnowledgeEntry::touch(self)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        KnowledgeEntry::validate(self)
    }
}

/// SQLite-backed document store for all collections.
pub struct SqliteDocStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteDocStore<'conn> {
    /// Wraps a migrated/ready connection.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Inserts or wholesale-overwrites one document.
    pub fn upsert<T: DocumentRecord>(&mut self, record: &T) -> RepoResult<()> {
        record.validate()?;
        let doc = encode_doc::<T>(record)?;

        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, updated_at, doc) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    updated_at = excluded.updated_at,
                    doc = excluded.doc;",
                T::COLLECTION.table()
            ),
            params![record.id(), record.updated_at(), doc],
        )?;

        Ok(())
    }

    /// Loads one document by id.
    pub fn get<T: DocumentRecord>(&mut self, id: &str) -> RepoResult<Option<T>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT doc FROM {} WHERE id = ?1;",
            T::COLLECTION.table()
        ))?;
        let mut rows = stmt.query([id])?;

        if let Some(row) = rows.next()? {
            let doc: String = row.get(0)?;
            return Ok(Some(decode_doc::<T>(&doc)?));
        }
        Ok(None)
    }

    /// Lists a whole collection, most recently updated first.
    pub fn list<T: DocumentRecord>(&mut self) -> RepoResult<Vec<T>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT doc FROM {} ORDER BY updated_at DESC, id ASC;",
            T::COLLECTION.table()
        ))?;
        let mut rows = stmt.query([])?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let doc: String = row.get(0)?;
            records.push(decode_doc::<T>(&doc)?);
        }
        Ok(records)
    }

    /// Deletes one document by id.
    pub fn delete<T: DocumentRecord>(&mut self, id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", T::COLLECTION.table()),
            [id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: T::COLLECTION,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Number of documents in one collection.
    pub fn count(&mut self, collection: Collection) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", collection.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Replaces the whole collection with `records` in one transaction.
    pub fn replace_all<T: DocumentRecord>(&mut self, records: &[T]) -> RepoResult<()> {
        for record in records {
            record.validate()?;
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(&format!("DELETE FROM {};", T::COLLECTION.table()), [])?;
        for record in records {
            let doc = encode_doc::<T>(record)?;
            tx.execute(
                &format!(
                    "INSERT INTO {} (id, updated_at, doc) VALUES (?1, ?2, ?3);",
                    T::COLLECTION.table()
                ),
                params![record.id(), record.updated_at(), doc],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Last-write-wins upsert: inserts new ids, overwrites strictly newer
    /// incoming records, skips the rest.
    pub fn upsert_if_newer<T: DocumentRecord>(&mut self, record: &T) -> RepoResult<MergeOutcome> {
        record.validate()?;

        let existing_updated_at: Option<i64> = {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT updated_at FROM {} WHERE id = ?1;",
                T::COLLECTION.table()
            ))?;
            let mut rows = stmt.query([record.id()])?;
            match rows.next()? {
                Some(row) => Some(row.get(0)?),
                None => None,
            }
        };

        match existing_updated_at {
            None => {
                self.upsert(record)?;
                Ok(MergeOutcome::Added)
            }
            Some(existing) if record.updated_at() > existing => {
                self.upsert(record)?;
                Ok(MergeOutcome::Updated)
            }
            Some(_) => Ok(MergeOutcome::Skipped),
        }
    }
}

fn encode_doc<T: DocumentRecord>(record: &T) -> RepoResult<String> {
    serde_json::to_string(record).map_err(|err| RepoError::InvalidDoc {
        collection: T::COLLECTION,
        message: format!("serialization failed: {err}"),
    })
}

fn decode_doc<T: DocumentRecord>(doc: &str) -> RepoResult<T> {
    let record: T = serde_json::from_str(doc).map_err(|err| RepoError::InvalidDoc {
        collection: T::COLLECTION,
        message: err.to_string(),
    })?;
    record.validate()?;
    Ok(record)
}
