//! Payment-method split, daily trend and expense categories.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::transaction_profit;
use crate::money::Money;
use crate::period::DateRange;
use crate::types::{Expense, PaymentMethod, Transaction};

/// Trends longer than this are not gap-filled.
const MAX_FILLED_DAYS: i64 = 366;

// =============================================================================
// Payment Methods
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdownRow {
    pub method: PaymentMethod,
    pub count: usize,
    pub amount: Money,
    /// Share of total revenue, percent.
    pub share: f64,
}

/// Count and amount per payment method. All four methods are always present,
/// in [`PaymentMethod::ALL`] order.
pub fn payment_breakdown(transactions: &[Transaction]) -> Vec<PaymentBreakdownRow> {
    let total: Money = transactions.iter().map(|t| t.total_amount).sum();

    PaymentMethod::ALL
        .into_iter()
        .map(|method| {
            let (count, amount) = transactions
                .iter()
                .filter(|t| t.payment_method == method)
                .fold((0usize, Money::zero()), |(n, sum), t| {
                    (n + 1, sum + t.total_amount)
                });

            PaymentBreakdownRow {
                method,
                count,
                amount,
                share: amount.percent_of(total),
            }
        })
        .collect()
}

// =============================================================================
// Daily Trend
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub revenue: Money,
    pub profit: Money,
    pub transactions: usize,
}

impl TrendPoint {
    fn empty(date: NaiveDate) -> Self {
        TrendPoint {
            date,
            revenue: Money::zero(),
            profit: Money::zero(),
            transactions: 0,
        }
    }
}

fn bucket_by_day(transactions: &[Transaction]) -> BTreeMap<NaiveDate, TrendPoint> {
    let mut days: BTreeMap<NaiveDate, TrendPoint> = BTreeMap::new();

    for t in transactions {
        let day = t.sale_day();
        let point = days.entry(day).or_insert_with(|| TrendPoint::empty(day));
        point.revenue += t.total_amount;
        point.profit += transaction_profit(t);
        point.transactions += 1;
    }

    days
}

/// Revenue, profit and count per calendar day with sales, oldest first.
pub fn daily_trend(transactions: &[Transaction]) -> Vec<TrendPoint> {
    bucket_by_day(transactions).into_values().collect()
}

/// Like [`daily_trend`] but with a zero point for every day of `range` that
/// had no sales, so charts get a continuous x axis. Sales outside the range
/// are ignored. Ranges over a year fall back to the sparse trend.
pub fn daily_trend_filled(transactions: &[Transaction], range: DateRange) -> Vec<TrendPoint> {
    if range.day_count() > MAX_FILLED_DAYS {
        return daily_trend(transactions);
    }

    let mut days = bucket_by_day(transactions);
    range
        .days()
        .map(|day| days.remove(&day).unwrap_or_else(|| TrendPoint::empty(day)))
        .collect()
}

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCategoryRow {
    pub category: String,
    pub count: usize,
    pub amount: Money,
    /// Share of all expenses, percent.
    pub share: f64,
}

/// Expenses grouped by category, largest first (ties by name).
///
/// Categories compare case-insensitively; a blank category is "uncategorized".
pub fn expense_breakdown(expenses: &[Expense]) -> Vec<ExpenseCategoryRow> {
    let total: Money = expenses.iter().map(|e| e.amount).sum();
    let mut groups: HashMap<String, ExpenseCategoryRow> = HashMap::new();

    for expense in expenses {
        let category = match expense.category.trim() {
            "" => "uncategorized".to_string(),
            name => name.to_lowercase(),
        };
        let row = groups
            .entry(category.clone())
            .or_insert_with(|| ExpenseCategoryRow {
                category,
                count: 0,
                amount: Money::zero(),
                share: 0.0,
            });
        row.count += 1;
        row.amount += expense.amount;
    }

    let mut rows: Vec<ExpenseCategoryRow> = groups
        .into_values()
        .map(|mut row| {
            row.share = row.amount.percent_of(total);
            row
        })
        .collect();

    rows.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn on_day(mut t: Transaction, day: u32) -> Transaction {
        t.sale_date = Utc.with_ymd_and_hms(2024, 3, day, 18, 30, 0).unwrap();
        t
    }

    #[test]
    fn test_payment_breakdown_has_every_method() {
        let rows = payment_breakdown(&[]);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.count == 0 && r.share == 0.0));

        let mut mpesa = sale("t-2", "s-1", "k-1", 300, 0);
        mpesa.payment_method = PaymentMethod::BankMpesa;
        let rows = payment_breakdown(&[sale("t-1", "s-1", "k-1", 100, 0), mpesa]);

        assert_eq!(rows[0].method, PaymentMethod::Cash);
        assert_eq!(rows[0].amount, Money::from_units(100));
        assert_eq!(rows[0].share, 25.0);
        assert_eq!(rows[1].count, 1);
        assert_eq!(rows[1].share, 75.0);
        assert_eq!(rows[3].count, 0);
    }

    #[test]
    fn test_daily_trend_sorted_by_date() {
        let transactions = vec![
            on_day(sale("t-1", "s-1", "k-1", 100, 40), 12),
            on_day(sale("t-2", "s-1", "k-1", 200, 50), 10),
            on_day(sale("t-3", "s-1", "k-1", 50, 10), 12),
        ];
        let trend = daily_trend(&transactions);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(trend[1].transactions, 2);
        assert_eq!(trend[1].revenue, Money::from_units(150));
        assert_eq!(trend[1].profit, Money::from_units(100));
    }

    #[test]
    fn test_daily_trend_filled() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let range = DateRange::new(start, start + Duration::days(4)).unwrap();
        let transactions = vec![
            on_day(sale("t-1", "s-1", "k-1", 100, 40), 10),
            on_day(sale("t-2", "s-1", "k-1", 100, 40), 20),
        ];

        let trend = daily_trend_filled(&transactions, range);
        assert_eq!(trend.len(), 5);
        assert_eq!(trend[0].transactions, 0);
        assert_eq!(trend[1].transactions, 1);
        assert_eq!(trend[4].date, NaiveDate::from_ymd_opt(2024, 3, 13).unwrap());
    }

    #[test]
    fn test_expense_breakdown() {
        let expenses = vec![
            expense("Rent", 600),
            expense("rent", 200),
            expense("transport", 200),
            expense("  ", 0),
        ];
        let rows = expense_breakdown(&expenses);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].category, "rent");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].amount, Money::from_units(800));
        assert_eq!(rows[0].share, 80.0);
        assert_eq!(rows[1].category, "transport");
        assert_eq!(rows[2].category, "uncategorized");
        assert!(expense_breakdown(&[]).is_empty());
    }
}
