//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate storage, calculation and transport into the operations
//!   callers invoke directly.
//! - Keep callers decoupled from SQL, serde and HTTP details.

pub mod backup_service;
pub mod directory_service;
pub mod project_service;

pub use backup_service::{BackupError, BackupService};
pub use directory_service::DirectoryService;
pub use project_service::ProjectService;
