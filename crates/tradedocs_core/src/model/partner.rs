//! Seller and consignee address-book records.
//!
//! Sellers and consignees live in separate collections even though the
//! shapes match: the original data files keep them apart and merge import
//! must not cross-pollinate the two.

use crate::model::{new_doc_id, now_epoch_ms, require_field, require_id, ValidationError};
use serde::{Deserialize, Serialize};

/// Exporting party printed in the document header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Free-form contact line (phone, email, attn).
    pub contact: String,
    pub updated_at: i64,
}

impl Seller {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_doc_id(),
            name: name.into(),
            address: String::new(),
            contact: String::new(),
            updated_at: now_epoch_ms(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("seller", &self.id)?;
        require_field("seller", "name", &self.name)
    }
}

/// Receiving party printed in the document header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consignee {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Free-form contact line (phone, email, attn).
    pub contact: String,
    pub updated_at: i64,
}

impl Consignee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_doc_id(),
            name: name.into(),
            address: String::new(),
            contact: String::new(),
            updated_at: now_epoch_ms(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("consignee", &self.id)?;
        require_field("consignee", "name", &self.name)
    }
}
