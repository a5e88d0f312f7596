//! # Financial Analytics
//!
//! Turns raw transactions, credits, expenses and products into the numbers
//! shown on every report screen.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Report Computation                               │
//! │                                                                         │
//! │   repositories (duka-db)                                                │
//! │        │  Vec<Transaction>, Vec<Credit>, Vec<Expense>, Vec<Product>     │
//! │        ▼                                                                │
//! │   RecordFilter (period.rs)  ── date range / shop / cashier              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────┬──────────────┬──────────────┬──────────────┐         │
//! │   │  financial   │   credit     │ performance  │  breakdown   │         │
//! │   │  Financial-  │  Credit-     │  shop /      │  payments /  │         │
//! │   │  Summary     │  Summary     │  cashier /   │  trend /     │         │
//! │   │              │              │  product     │  expenses    │         │
//! │   └──────────────┴──────────────┴──────────────┴──────────────┘         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   UnifiedReport  ── one JSON document per request / dashboard refresh   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Every function is a pure reduction: no I/O, no clock, no panics.
//! - Empty input gives all-zero output.
//! - Percentages use [`Money::percent_of`], which is 0 for a zero base.
//! - Amounts are already coerced to non-negative [`Money`] by the time they
//!   get here; nothing in this module can fail.

mod breakdown;
mod credit;
mod financial;
mod inventory;
mod performance;

pub use breakdown::{
    daily_trend, daily_trend_filled, expense_breakdown, payment_breakdown, ExpenseCategoryRow,
    PaymentBreakdownRow, TrendPoint,
};
pub use credit::CreditSummary;
pub use financial::FinancialSummary;
pub use inventory::{InventorySummary, LowStockItem};
pub use performance::{
    cashier_performance, label_rows, product_performance, shop_performance, PerformanceRow,
    ProductRow,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::period::DateRange;
use crate::types::{Credit, Expense, Product, Transaction};

/// Number of products listed in the top-products section of a report.
pub const DEFAULT_TOP_PRODUCTS: usize = 10;

// =============================================================================
// Per-Transaction Helpers
// =============================================================================

/// Cost of goods for one sale.
///
/// Summed from the item snapshots (buying price × quantity). When a sale has
/// no items, or its items carry no buying prices, the cost recorded on the
/// transaction is used instead.
///
/// ```rust
/// use chrono::Utc;
/// use duka_core::analytics::transaction_cost;
/// use duka_core::{Money, PaymentMethod, Transaction};
///
/// let sale = Transaction {
///     id: "t-1".into(), shop_id: "s-1".into(), cashier_id: "k-1".into(),
///     items: vec![], total_amount: Money::from_units(500),
///     payment_method: PaymentMethod::Cash, cash_amount: Money::from_units(500),
///     mpesa_amount: Money::zero(), cost: Money::from_units(320),
///     profit: Money::zero(), customer_name: None, sale_date: Utc::now(),
/// };
///
/// // No items: falls back to the recorded cost.
/// assert_eq!(transaction_cost(&sale), Money::from_units(320));
/// ```
pub fn transaction_cost(t: &Transaction) -> Money {
    let from_items: Money = t.items.iter().map(|item| item.cost()).sum();
    if from_items.is_zero() {
        t.cost.non_negative()
    } else {
        from_items
    }
}

/// Revenue minus cost. Negative when sold at a loss.
#[inline]
pub fn transaction_profit(t: &Transaction) -> Money {
    t.total_amount - transaction_cost(t)
}

// =============================================================================
// Totals
// =============================================================================

pub fn total_revenue(transactions: &[Transaction]) -> Money {
    transactions.iter().map(|t| t.total_amount).sum()
}

pub fn cost_of_goods_sold(transactions: &[Transaction]) -> Money {
    transactions.iter().map(transaction_cost).sum()
}

pub fn total_expenses(expenses: &[Expense]) -> Money {
    expenses.iter().map(|e| e.amount).sum()
}

/// Σ balance due over credits not marked paid.
pub fn outstanding_credit(credits: &[Credit]) -> Money {
    credits
        .iter()
        .filter(|c| !c.is_paid())
        .map(|c| c.balance_due)
        .sum()
}

// =============================================================================
// Unified Report
// =============================================================================

/// Every report section computed from one filtered data set.
///
/// Served by `GET /api/reports/unified` and cached as the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedReport {
    pub range: Option<DateRange>,
    pub summary: FinancialSummary,
    pub credits: CreditSummary,
    pub payments: Vec<PaymentBreakdownRow>,
    pub trend: Vec<TrendPoint>,
    pub shops: Vec<PerformanceRow>,
    pub cashiers: Vec<PerformanceRow>,
    pub top_products: Vec<ProductRow>,
    pub expenses: Vec<ExpenseCategoryRow>,
    pub inventory: InventorySummary,
}

impl UnifiedReport {
    /// Inputs must already be filtered to the wanted range / shop / cashier;
    /// `range` is echoed back and used to fill gaps in the trend.
    pub fn compute(
        range: Option<DateRange>,
        transactions: &[Transaction],
        credits: &[Credit],
        expenses: &[Expense],
        products: &[Product],
        today: NaiveDate,
    ) -> Self {
        let trend = match range {
            Some(r) => daily_trend_filled(transactions, r),
            None => daily_trend(transactions),
        };

        UnifiedReport {
            range,
            summary: FinancialSummary::compute(transactions, credits, expenses),
            credits: CreditSummary::compute(credits, today),
            payments: payment_breakdown(transactions),
            trend,
            shops: shop_performance(transactions),
            cashiers: cashier_performance(transactions),
            top_products: product_performance(transactions, DEFAULT_TOP_PRODUCTS),
            expenses: expense_breakdown(expenses),
            inventory: InventorySummary::compute(products),
        }
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================


// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::types::CreditStatus;

    #[test]
    fn test_cost_from_items() {
        let mut t = sale("t-1", "s-1", "k-1", 500, 999);
        t.items = vec![item("p-1", 2, 150, 100), item("p-2", 1, 200, 120)];

        assert_eq!(transaction_cost(&t), Money::from_units(320));
        assert_eq!(transaction_profit(&t), Money::from_units(180));
    }

    #[test]
    fn test_cost_falls_back_when_items_have_no_cost() {
        let mut t = sale("t-1", "s-1", "k-1", 500, 300);
        t.items = vec![item("p-1", 2, 250, 0)];

        assert_eq!(transaction_cost(&t), Money::from_units(300));
        assert_eq!(transaction_profit(&t), Money::from_units(200));
    }

    #[test]
    fn test_profit_is_revenue_minus_cost() {
        for (total, cost) in [(0, 0), (100, 0), (100, 100), (100, 130), (12_345, 6_789)] {
            let t = sale("t", "s", "k", total, cost);
            assert_eq!(
                transaction_profit(&t),
                Money::from_units(total) - Money::from_units(cost)
            );
        }
    }

    #[test]
    fn test_totals_of_empty_inputs_are_zero() {
        assert_eq!(total_revenue(&[]), Money::zero());
        assert_eq!(cost_of_goods_sold(&[]), Money::zero());
        assert_eq!(total_expenses(&[]), Money::zero());
        assert_eq!(outstanding_credit(&[]), Money::zero());
    }

    #[test]
    fn test_outstanding_ignores_paid_credits() {
        let credits = vec![
            credit(1000, 400, CreditStatus::PartiallyPaid),
            credit(500, 0, CreditStatus::Pending),
            credit(300, 300, CreditStatus::Paid),
        ];
        assert_eq!(outstanding_credit(&credits), Money::from_units(1100));
    }

    #[test]
    fn test_unified_report_sections_agree() {
        let transactions = vec![
            sale("t-1", "s-1", "k-1", 1000, 600),
            sale("t-2", "s-2", "k-2", 500, 200),
        ];
        let expenses = vec![expense("rent", 300)];
        let products = vec![product("p-1", 10, 0, 2)];
        let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();

        let report =
            UnifiedReport::compute(None, &transactions, &[], &expenses, &products, today);

        let shop_revenue: Money = report.shops.iter().map(|r| r.revenue).sum();
        assert_eq!(shop_revenue, report.summary.total_revenue);
        assert_eq!(report.summary.net_profit, Money::from_units(400));
        assert_eq!(report.inventory.out_of_stock_count, 1);
        assert_eq!(report.trend.len(), 1);
    }
}
