//! Project document: header, product line items and settlement inputs.
//!
//! # Responsibility
//! - Define the single record all four paper projections (commercial
//!   invoice, customs declaration, certificate of origin, settlement
//!   statement) are rendered from.
//! - Provide validation enforced on every write and on read of persisted
//!   documents.
//!
//! # Invariants
//! - Line-item quantities, prices, weights and settlement amounts are
//!   never negative.
//! - `vat_rate` and `refund_rate` stay within [0, 1].
//! - `seller_id`/`consignee_id` are loose references; a dangling reference
//!   is legal and resolved (or left blank) at render time.

use crate::model::{new_doc_id, now_epoch_ms, require_field, require_id, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shared header fields of one paperwork project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderInfo {
    pub invoice_no: String,
    pub contract_no: String,
    /// Document date as entered, e.g. `2026-08-28`. Kept verbatim.
    pub date: String,
    /// Reference into the sellers collection; may dangle.
    pub seller_id: Option<String>,
    /// Reference into the consignees collection; may dangle.
    pub consignee_id: Option<String>,
    /// ISO currency code of the invoice, e.g. `USD`.
    pub currency: String,
    /// Incoterm plus named place, e.g. `FOB SHANGHAI`.
    pub trade_terms: String,
    pub port_of_loading: String,
    pub port_of_destination: String,
    pub country_of_origin: String,
    pub remarks: String,
}

/// One product line item shared by invoice and customs projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductItem {
    pub id: String,
    pub description: String,
    pub hs_code: String,
    pub quantity: Decimal,
    pub unit: String,
    /// Unit price in the invoice currency.
    pub unit_price: Decimal,
    pub net_weight_kg: Decimal,
    pub gross_weight_kg: Decimal,
}

impl ProductItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: new_doc_id(),
            description: description.into(),
            hs_code: String::new(),
            quantity: Decimal::ZERO,
            unit: String::new(),
            unit_price: Decimal::ZERO,
            net_weight_kg: Decimal::ZERO,
            gross_weight_kg: Decimal::ZERO,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("product_item", &self.id)?;
        require_non_negative("product_item", "quantity", self.quantity)?;
        require_non_negative("product_item", "unit_price", self.unit_price)?;
        require_non_negative("product_item", "net_weight_kg", self.net_weight_kg)?;
        require_non_negative("product_item", "gross_weight_kg", self.gross_weight_kg)?;
        Ok(())
    }
}

/// One foreign-exchange settlement receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxItem {
    pub id: String,
    /// Receipt date as entered.
    pub date: String,
    /// Received amount in the invoice currency.
    pub amount: Decimal,
    /// Exchange rate in CNY per unit of the invoice currency.
    pub rate: Decimal,
    pub note: String,
}

impl FxItem {
    pub fn new(amount: Decimal, rate: Decimal) -> Self {
        Self {
            id: new_doc_id(),
            date: String::new(),
            amount,
            rate,
            note: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("fx_item", &self.id)?;
        require_non_negative("fx_item", "amount", self.amount)?;
        require_non_negative("fx_item", "rate", self.rate)?;
        Ok(())
    }
}

/// One domestic purchase with its VAT invoice, the tax-refund basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostItem {
    pub id: String,
    pub supplier: String,
    pub invoice_no: String,
    /// VAT-inclusive purchase amount in CNY.
    pub amount: Decimal,
    /// VAT rate on the purchase invoice, e.g. `0.13`.
    pub vat_rate: Decimal,
    /// Export refund rate for the goods, e.g. `0.13`.
    pub refund_rate: Decimal,
}

impl CostItem {
    pub fn new(supplier: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: new_doc_id(),
            supplier: supplier.into(),
            invoice_no: String::new(),
            amount,
            vat_rate: Decimal::ZERO,
            refund_rate: Decimal::ZERO,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("cost_item", &self.id)?;
        require_non_negative("cost_item", "amount", self.amount)?;
        require_rate("cost_item", "vat_rate", self.vat_rate)?;
        require_rate("cost_item", "refund_rate", self.refund_rate)?;
        Ok(())
    }
}

/// One miscellaneous expense booked against the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraExpense {
    pub id: String,
    pub label: String,
    /// Expense amount in CNY.
    pub amount: Decimal,
}

impl ExtraExpense {
    pub fn new(label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: new_doc_id(),
            label: label.into(),
            amount,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("extra_expense", &self.id)?;
        require_non_negative("extra_expense", "amount", self.amount)?;
        Ok(())
    }
}

/// Settlement inputs: FX receipts, purchase costs and extra expenses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementInfo {
    pub fx_items: Vec<FxItem>,
    pub cost_items: Vec<CostItem>,
    pub extra_expenses: Vec<ExtraExpense>,
}

impl SettlementInfo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for item in &self.fx_items {
            item.validate()?;
        }
        for item in &self.cost_items {
            item.validate()?;
        }
        for item in &self.extra_expenses {
            item.validate()?;
        }
        Ok(())
    }
}

/// One paperwork project, persisted wholesale as a single document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub header: HeaderInfo,
    pub items: Vec<ProductItem>,
    pub settlement: SettlementInfo,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Project {
    /// Creates an empty project with a generated id and current timestamps.
    pub fn new(name: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: new_doc_id(),
            name: name.into(),
            header: HeaderInfo::default(),
            items: Vec::new(),
            settlement: SettlementInfo::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Bumps `updated_at` to now. Called by every wholesale save.
    pub fn touch(&mut self) {
        self.updated_at = now_epoch_ms();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id("project", &self.id)?;
        require_field("project", "name", &self.name)?;
        for item in &self.items {
            item.validate()?;
        }
        self.settlement.validate()
    }
}

fn require_non_negative(
    record: &'static str,
    field: &'static str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount { record, field });
    }
    Ok(())
}

fn require_rate(
    record: &'static str,
    field: &'static str,
    value: Decimal,
) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ValidationError::RateOutOfRange { record, field });
    }
    Ok(())
}
