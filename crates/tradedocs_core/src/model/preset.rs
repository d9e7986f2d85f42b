//! Reusable header presets and the free-text knowledge base.

use crate::model::{new_doc_id, now_epoch_ms, require_field, require_id, ValidationError};
use serde::{Deserialize, Serialize};

/// Named bundle of header defaults applied to new projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub trade_terms: String,
    pub port_of_loading: String,
    pub port_of_destination: String,
    pub payment_terms: String,
    pub updated_at: i64,
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_doc_id(),
            name: name.into(),
            currency: String::new(),
            trade_terms: String::new(),
            port_of_loading: String::new(),
            port_of_destination: String::new(),
            payment_terms: String::new(),
            updated_at: now_epoch_ms(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("preset", &self.id)?;
        require_field("preset", "name", &self.name)
    }
}

/// Keyword-indexed snippet reused across documents (goods descriptions,
/// declaration remarks, bank details).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    pub id: String,
    pub keyword: String,
    pub body: String,
    pub updated_at: i64,
}

impl KnowledgeEntry {
    pub fn new(keyword: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: new_doc_id(),
            keyword: keyword.into(),
            body: body.into(),
            updated_at: now_epoch_ms(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("knowledge_entry", &self.id)?;
        require_field("knowledge_entry", "keyword", &self.keyword)
    }
}
