//! Reducers over product items and settlement inputs.
//!
//! All intermediate sums keep full `Decimal` precision. The summary
//! finalizer rounds money to 2 decimal places and the margin to 4, with
//! midpoints away from zero to match conventional paperwork rounding.

use crate::model::project::{CostItem, ExtraExpense, FxItem, ProductItem, SettlementInfo};
use rust_decimal::{Decimal, RoundingStrategy};

const MONEY_DP: u32 = 2;
const MARGIN_DP: u32 = 4;

/// Column totals of the commercial-invoice item table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub amount: Decimal,
    pub quantity: Decimal,
    pub net_weight_kg: Decimal,
    pub gross_weight_kg: Decimal,
}

/// Settlement-statement bottom line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementSummary {
    /// Σ fx amount × rate, in CNY.
    pub fx_revenue_cny: Decimal,
    /// Σ VAT-inclusive purchase amounts, in CNY.
    pub purchase_cost: Decimal,
    /// Σ amount ÷ (1 + vat_rate) × refund_rate, in CNY.
    pub tax_refund: Decimal,
    /// Σ extra expenses, in CNY.
    pub expenses: Decimal,
    /// fx_revenue_cny + tax_refund − purchase_cost − expenses.
    pub gross_profit: Decimal,
    /// gross_profit ÷ fx_revenue_cny; `None` when revenue is zero.
    pub profit_margin: Option<Decimal>,
}

/// Amount of one invoice line: quantity × unit price.
pub fn line_amount(item: &ProductItem) -> Decimal {
    item.quantity * item.unit_price
}

/// Sums the invoice item table columns.
pub fn invoice_totals(items: &[ProductItem]) -> InvoiceTotals {
    items.iter().fold(InvoiceTotals::default(), |mut acc, item| {
        acc.amount += line_amount(item);
        acc.quantity += item.quantity;
        acc.net_weight_kg += item.net_weight_kg;
        acc.gross_weight_kg += item.gross_weight_kg;
        acc
    })
}

/// CNY revenue across FX settlement receipts.
pub fn fx_revenue_cny(items: &[FxItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc + item.amount * item.rate)
}

/// Total VAT-inclusive purchase cost.
pub fn purchase_cost(items: &[CostItem]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |acc, item| acc + item.amount)
}

/// Export tax refund: the VAT-exclusive base of each purchase times its
/// refund rate.
pub fn tax_refund(items: &[CostItem]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |acc, item| {
        acc + item.amount / (Decimal::ONE + item.vat_rate) * item.refund_rate
    })
}

/// Total of miscellaneous expenses.
pub fn expenses_total(items: &[ExtraExpense]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |acc, item| acc + item.amount)
}

/// Reduces settlement inputs into the rounded bottom line.
pub fn settle(settlement: &SettlementInfo) -> SettlementSummary {
    let fx_revenue = fx_revenue_cny(&settlement.fx_items);
    let cost = purchase_cost(&settlement.cost_items);
    let refund = tax_refund(&settlement.cost_items);
    let expenses = expenses_total(&settlement.extra_expenses);
    let gross_profit = fx_revenue + refund - cost - expenses;

    let profit_margin = if fx_revenue.is_zero() {
        None
    } else {
        Some(round_to(gross_profit / fx_revenue, MARGIN_DP))
    };

    SettlementSummary {
        fx_revenue_cny: round_to(fx_revenue, MONEY_DP),
        purchase_cost: round_to(cost, MONEY_DP),
        tax_refund: round_to(refund, MONEY_DP),
        expenses: round_to(expenses, MONEY_DP),
        gross_profit: round_to(gross_profit, MONEY_DP),
        profit_margin,
    }
}

fn round_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::{invoice_totals, line_amount, settle, tax_refund};
    use crate::model::project::{
        CostItem, ExtraExpense, FxItem, ProductItem, SettlementInfo,
    };
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(text: &str) -> Decimal {
        Decimal::from_str(text).expect("literal decimal")
    }

    fn item(quantity: &str, unit_price: &str) -> ProductItem {
        let mut item = ProductItem::new("goods");
        item.quantity = dec(quantity);
        item.unit_price = dec(unit_price);
        item
    }

    #[test]
    fn line_amount_multiplies_quantity_by_unit_price() {
        assert_eq!(line_amount(&item("250", "3.47")), dec("867.50"));
    }

    #[test]
    fn invoice_totals_sum_all_columns() {
        let mut first = item("10", "2.5");
        first.net_weight_kg = dec("18");
        first.gross_weight_kg = dec("20");
        let mut second = item("4", "100");
        second.net_weight_kg = dec("7.5");
        second.gross_weight_kg = dec("9");

        let totals = invoice_totals(&[first, second]);
        assert_eq!(totals.amount, dec("425"));
        assert_eq!(totals.quantity, dec("14"));
        assert_eq!(totals.net_weight_kg, dec("25.5"));
        assert_eq!(totals.gross_weight_kg, dec("29"));
    }

    #[test]
    fn tax_refund_backs_vat_out_of_gross_amount() {
        let mut cost = CostItem::new("mill", dec("11300"));
        cost.vat_rate = dec("0.13");
        cost.refund_rate = dec("0.13");
        // 11300 / 1.13 = 10000 net, refunded at 13%.
        assert_eq!(tax_refund(&[cost]), dec("1300"));
    }

    #[test]
    fn settle_applies_gross_profit_formula() {
        let mut cost = CostItem::new("mill", dec("11300"));
        cost.vat_rate = dec("0.13");
        cost.refund_rate = dec("0.13");
        let settlement = SettlementInfo {
            fx_items: vec![FxItem::new(dec("2000"), dec("7.2"))],
            cost_items: vec![cost],
            extra_expenses: vec![ExtraExpense::new("freight", dec("350"))],
        };

        let summary = settle(&settlement);
        assert_eq!(summary.fx_revenue_cny, dec("14400.00"));
        assert_eq!(summary.purchase_cost, dec("11300.00"));
        assert_eq!(summary.tax_refund, dec("1300.00"));
        assert_eq!(summary.expenses, dec("350.00"));
        // 14400 + 1300 - 11300 - 350
        assert_eq!(summary.gross_profit, dec("4050.00"));
        assert_eq!(summary.profit_margin, Some(dec("0.2813")));
    }

    #[test]
    fn settle_without_fx_revenue_has_no_margin() {
        let settlement = SettlementInfo {
            fx_items: vec![],
            cost_items: vec![CostItem::new("mill", dec("100"))],
            extra_expenses: vec![],
        };

        let summary = settle(&settlement);
        assert_eq!(summary.gross_profit, dec("-100.00"));
        assert_eq!(summary.profit_margin, None);
    }

    #[test]
    fn settle_on_empty_inputs_is_all_zero() {
        let summary = settle(&SettlementInfo::default());
        assert_eq!(summary.gross_profit, Decimal::ZERO);
        assert_eq!(summary.profit_margin, None);
    }
}
