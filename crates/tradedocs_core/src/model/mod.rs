//! Flat domain records for trade paperwork.
//!
//! # Responsibility
//! - Define the canonical documents shared by invoice/customs/settlement
//!   projections of one project.
//! - Keep records serde-compatible with the camelCase backup envelope.
//!
//! # Invariants
//! - Every record carries a stable string `id`; generated ids are UUIDv4,
//!   imported ids are accepted verbatim.
//! - `updated_at` is Unix epoch milliseconds and moves forward on every
//!   wholesale save.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod partner;
pub mod preset;
pub mod project;

/// Generates a fresh stable document id.
pub fn new_doc_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

/// Record-level validation failure shared by all document types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyId { record: &'static str },
    EmptyField { record: &'static str, field: &'static str },
    NegativeAmount { record: &'static str, field: &'static str },
    RateOutOfRange { record: &'static str, field: &'static str },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId { record } => write!(f, "{record} id must not be empty"),
            Self::EmptyField { record, field } => {
                write!(f, "{record}.{field} must not be empty")
            }
            Self::NegativeAmount { record, field } => {
                write!(f, "{record}.{field} must not be negative")
            }
            Self::RateOutOfRange { record, field } => {
                write!(f, "{record}.{field} must be within [0, 1]")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_id(record: &'static str, id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::EmptyId { record });
    }
    Ok(())
}

pub(crate) fn require_field(
    record: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { record, field });
    }
    Ok(())
}
