//! Address-book and reference-data use-case service.
//!
//! One generic surface covers sellers, consignees, presets and knowledge
//! entries; the record type picks the collection through
//! [`DocumentRecord::COLLECTION`].

use crate::db::Storage;
use crate::repo::doc_store::{DocumentRecord, RepoResult, SqliteDocStore};

/// Use-case wrapper for the non-project collections.
pub struct DirectoryService<'s> {
    storage: &'s mut Storage,
}

impl<'s> DirectoryService<'s> {
    pub fn new(storage: &'s mut Storage) -> Self {
        Self { storage }
    }

    /// Persists one record wholesale, bumping its `updated_at`.
    pub fn save<T: DocumentRecord>(&mut self, record: &mut T) -> RepoResult<()> {
        record.touch();
        let snapshot: &T = record;
        self.storage
            .run(|conn| SqliteDocStore::new(conn).upsert(snapshot))
    }

    /// Loads one record by id.
    pub fn get<T: DocumentRecord>(&mut self, id: &str) -> RepoResult<Option<T>> {
        self.storage.run(|conn| SqliteDocStore::new(conn).get(id))
    }

    /// Lists one collection, most recently updated first.
    pub fn list<T: DocumentRecord>(&mut self) -> RepoResult<Vec<T>> {
        self.storage.run(|conn| SqliteDocStore::new(conn).list())
    }

    /// Deletes one record by id.
    pub fn delete<T: DocumentRecord>(&mut self, id: &str) -> RepoResult<()> {
        self.storage
            .run(|conn| SqliteDocStore::new(conn).delete::<T>(id))
    }
}
