//! Core domain logic for TradeDocs: trade-paperwork documents, settlement
//! arithmetic, local persistence and backup/restore.
//! This crate is the single source of truth for business invariants.

pub mod backup;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod settlement;
pub mod sync;

pub use backup::{BackupEnvelope, BackupMeta, ImportMode, ImportReport};
pub use db::{DbError, Storage};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::partner::{Consignee, Seller};
pub use model::preset::{KnowledgeEntry, Preset};
pub use model::project::{
    CostItem, ExtraExpense, FxItem, HeaderInfo, ProductItem, Project, SettlementInfo,
};
pub use model::ValidationError;
pub use repo::doc_store::{Collection, MergeOutcome, RepoError, RepoResult, SqliteDocStore};
pub use service::{BackupError, BackupService, DirectoryService, ProjectService};
pub use settlement::{invoice_totals, settle, InvoiceTotals, SettlementSummary};
pub use sync::{RemoteBackupStore, SyncError, WebDavClient, WebDavConfig};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
