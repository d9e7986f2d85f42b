//! Settlement and invoice arithmetic.
//!
//! # Responsibility
//! - Reduce line items and settlement inputs into invoice totals and the
//!   settlement summary.
//! - Keep every money operation on `Decimal`; floats never touch amounts.
//!
//! # Invariants
//! - gross profit = FX revenue + tax refund − purchase cost − expenses.
//! - Rounding to display precision happens once, in summary finalization,
//!   never mid-reduction.

pub mod calc;

pub use calc::{
    expenses_total, fx_revenue_cny, invoice_totals, line_amount, purchase_cost, settle,
    tax_refund, InvoiceTotals, SettlementSummary,
};
