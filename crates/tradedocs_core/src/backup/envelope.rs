//! The backup envelope: one JSON document holding every collection.

use crate::model::now_epoch_ms;
use crate::model::partner::{Consignee, Seller};
use crate::model::preset::{KnowledgeEntry, Preset};
use crate::model::project::Project;
use serde::{Deserialize, Serialize};

/// `meta.app` value written by this crate and required on import.
pub const BACKUP_APP_ID: &str = "tradedocs";

/// Envelope schema version understood by this binary.
pub const BACKUP_SCHEMA_VERSION: u32 = 1;

/// Envelope header identifying producer and format age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    pub app: String,
    pub schema: u32,
    pub exported_at: i64,
}

impl BackupMeta {
    pub fn current() -> Self {
        Self {
            app: BACKUP_APP_ID.to_string(),
            schema: BACKUP_SCHEMA_VERSION,
            exported_at: now_epoch_ms(),
        }
    }
}

/// Full snapshot of the local store.
///
/// Collection fields default to empty so partial backups (for example a
/// sellers-only hand-off) still merge cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEnvelope {
    pub meta: BackupMeta,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub sellers: Vec<Seller>,
    #[serde(default)]
    pub consignees: Vec<Consignee>,
    #[serde(default)]
    pub presets: Vec<Preset>,
    #[serde(default)]
    pub knowledge_base: Vec<KnowledgeEntry>,
}

impl BackupEnvelope {
    /// Creates an empty envelope with a fresh `exportedAt`.
    pub fn empty() -> Self {
        Self {
            meta: BackupMeta::current(),
            projects: Vec::new(),
            sellers: Vec::new(),
            consignees: Vec::new(),
            presets: Vec::new(),
            knowledge_base: Vec::new(),
        }
    }

    /// Total record count across all collections.
    pub fn record_count(&self) -> usize {
        self.projects.len()
            + self.sellers.len()
            + self.consignees.len()
            + self.presets.len()
            + self.knowledge_base.len()
    }
}
