//! Repository layer: JSON document persistence per collection.
//!
//! # Responsibility
//! - Provide wholesale document storage over the collection tables.
//! - Isolate SQL and serde details from service/business orchestration.
//!
//! # Invariants
//! - Writes validate records before persistence; reads reject invalid
//!   persisted state instead of masking it.
//! - Documents are replaced whole; repositories never patch fields.

pub mod doc_store;
