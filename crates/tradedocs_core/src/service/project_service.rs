//! Project use-case service.
//!
//! # Responsibility
//! - Provide wholesale CRUD entry points for projects.
//! - Compute the settlement summary for a stored project.
//!
//! # Invariants
//! - Every save bumps `updated_at` and goes through record validation.
//! - Storage access runs under the single-reconnect retry policy.

use crate::db::Storage;
use crate::model::project::Project;
use crate::repo::doc_store::{Collection, RepoError, RepoResult, SqliteDocStore};
use crate::settlement::{settle, SettlementSummary};

/// Use-case wrapper for project CRUD and settlement.
pub struct ProjectService<'s> {
    storage: &'s mut Storage,
}

impl<'s> ProjectService<'s> {
    pub fn new(storage: &'s mut Storage) -> Self {
        Self { storage }
    }

    /// Creates and persists an empty project.
    pub fn create_project(&mut self, name: impl Into<String>) -> RepoResult<Project> {
        let project = Project::new(name);
        self.storage
            .run(|conn| SqliteDocStore::new(conn).upsert(&project))?;
        Ok(project)
    }

    /// Persists a whole project document, bumping its `updated_at`.
    pub fn save_project(&mut self, project: &mut Project) -> RepoResult<()> {
        project.touch();
        let snapshot: &Project = project;
        self.storage
            .run(|conn| SqliteDocStore::new(conn).upsert(snapshot))
    }

    /// Loads one project by id.
    pub fn get_project(&mut self, id: &str) -> RepoResult<Option<Project>> {
        self.storage.run(|conn| SqliteDocStore::new(conn).get(id))
    }

    /// Lists all projects, most recently updated first.
    pub fn list_projects(&mut self) -> RepoResult<Vec<Project>> {
        self.storage.run(|conn| SqliteDocStore::new(conn).list())
    }

    /// Deletes one project by id.
    pub fn delete_project(&mut self, id: &str) -> RepoResult<()> {
        self.storage
            .run(|conn| SqliteDocStore::new(conn).delete::<Project>(id))
    }

    /// Computes the settlement summary of a stored project.
    pub fn settle_project(&mut self, id: &str) -> RepoResult<SettlementSummary> {
        let project = self
            .get_project(id)?
            .ok_or_else(|| RepoError::NotFound {
                collection: Collection::Projects,
                id: id.to_string(),
            })?;
        Ok(settle(&project.settlement))
    }
}
