//! Group-by reductions: per shop, per cashier, per product.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::transaction_profit;
use crate::money::Money;
use crate::types::Transaction;

/// One group in a shop or cashier ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRow {
    pub id: String,
    /// Display name, filled in by the caller when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub transactions: usize,
    pub revenue: Money,
    pub profit: Money,
    pub profit_margin: f64,
}

impl PerformanceRow {
    fn new(id: &str) -> Self {
        PerformanceRow {
            id: id.to_string(),
            name: None,
            transactions: 0,
            revenue: Money::zero(),
            profit: Money::zero(),
            profit_margin: 0.0,
        }
    }
}

/// Attaches display names to rows by id. Unknown ids keep `None`.
pub fn label_rows(rows: &mut [PerformanceRow], names: &HashMap<String, String>) {
    for row in rows {
        row.name = names.get(&row.id).cloned();
    }
}

fn group_by<F>(transactions: &[Transaction], key: F) -> Vec<PerformanceRow>
where
    F: Fn(&Transaction) -> &str,
{
    let mut groups: HashMap<&str, PerformanceRow> = HashMap::new();

    for t in transactions {
        let id = key(t);
        let row = groups.entry(id).or_insert_with(|| PerformanceRow::new(id));
        row.transactions += 1;
        row.revenue += t.total_amount;
        row.profit += transaction_profit(t);
    }

    let mut rows: Vec<PerformanceRow> = groups
        .into_values()
        .map(|mut row| {
            row.profit_margin = row.profit.percent_of(row.revenue);
            row
        })
        .collect();

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.id.cmp(&b.id)));
    rows
}

/// Revenue ranking of shops, highest first (ties by id).
pub fn shop_performance(transactions: &[Transaction]) -> Vec<PerformanceRow> {
    group_by(transactions, |t| t.shop_id.as_str())
}

/// Revenue ranking of cashiers, highest first (ties by id).
pub fn cashier_performance(transactions: &[Transaction]) -> Vec<PerformanceRow> {
    group_by(transactions, |t| t.cashier_id.as_str())
}

// =============================================================================
// Products
// =============================================================================

/// A product in the best-sellers list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub product_id: String,
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
}

/// Top `limit` products by revenue, from item snapshots.
///
/// A line whose stored total is missing is valued at unit price × quantity.
/// Transactions without items contribute nothing here.
pub fn product_performance(transactions: &[Transaction], limit: usize) -> Vec<ProductRow> {
    let mut groups: HashMap<&str, ProductRow> = HashMap::new();

    for item in transactions.iter().flat_map(|t| t.items.iter()) {
        let revenue = if item.total.is_zero() {
            item.unit_price.multiply_quantity(item.quantity.max(0))
        } else {
            item.total
        };

        let row = groups
            .entry(item.product_id.as_str())
            .or_insert_with(|| ProductRow {
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                quantity_sold: 0,
                revenue: Money::zero(),
                cost: Money::zero(),
                profit: Money::zero(),
            });
        row.quantity_sold = row.quantity_sold.saturating_add(item.quantity.max(0));
        row.revenue += revenue;
        row.cost += item.cost();
    }

    let mut rows: Vec<ProductRow> = groups
        .into_values()
        .map(|mut row| {
            row.profit = row.revenue - row.cost;
            row
        })
        .collect();

    rows.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::{cost_of_goods_sold, total_revenue};
    use super::*;

    fn sample() -> Vec<Transaction> {
        vec![
            sale("t-1", "s-1", "k-1", 1000, 600),
            sale("t-2", "s-2", "k-2", 700, 300),
            sale("t-3", "s-1", "k-2", 300, 100),
            sale("t-4", "s-3", "k-3", 700, 700),
        ]
    }

    #[test]
    fn test_shop_rows_sorted_and_summed() {
        let rows = shop_performance(&sample());

        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["s-1", "s-2", "s-3"]);

        assert_eq!(rows[0].transactions, 2);
        assert_eq!(rows[0].revenue, Money::from_units(1300));
        assert_eq!(rows[0].profit, Money::from_units(600));
        assert_eq!(rows[2].profit_margin, 0.0);
    }

    #[test]
    fn test_group_rows_sum_to_totals() {
        let transactions = sample();
        let total_profit = total_revenue(&transactions) - cost_of_goods_sold(&transactions);

        for rows in [
            shop_performance(&transactions),
            cashier_performance(&transactions),
        ] {
            let revenue: Money = rows.iter().map(|r| r.revenue).sum();
            let profit: Money = rows.iter().map(|r| r.profit).sum();
            let count: usize = rows.iter().map(|r| r.transactions).sum();

            assert_eq!(revenue, total_revenue(&transactions));
            assert_eq!(profit, total_profit);
            assert_eq!(count, transactions.len());
        }
    }

    #[test]
    fn test_cashier_ties_broken_by_id() {
        let transactions = vec![
            sale("t-1", "s-1", "k-b", 500, 0),
            sale("t-2", "s-1", "k-a", 500, 0),
        ];
        let rows = cashier_performance(&transactions);
        assert_eq!(rows[0].id, "k-a");
        assert_eq!(rows[1].id, "k-b");
    }

    #[test]
    fn test_empty_performance() {
        assert!(shop_performance(&[]).is_empty());
        assert!(product_performance(&[], 5).is_empty());
    }

    #[test]
    fn test_label_rows() {
        let mut rows = shop_performance(&sample());
        let names = HashMap::from([("s-1".to_string(), "Westlands".to_string())]);
        label_rows(&mut rows, &names);

        assert_eq!(rows[0].name.as_deref(), Some("Westlands"));
        assert_eq!(rows[1].name, None);
    }

    #[test]
    fn test_product_performance() {
        let mut t1 = sale("t-1", "s-1", "k-1", 0, 0);
        t1.items = vec![item("p-1", 2, 100, 60), item("p-2", 1, 500, 400)];
        let mut t2 = sale("t-2", "s-1", "k-1", 0, 0);
        let mut untotalled = item("p-1", 3, 100, 60);
        untotalled.total = Money::zero();
        t2.items = vec![untotalled, item("p-3", 1, 50, 10)];

        let rows = product_performance(&[t1, t2], 2);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].product_id, "p-1");
        assert_eq!(rows[0].quantity_sold, 5);
        assert_eq!(rows[0].revenue, Money::from_units(500));
        assert_eq!(rows[0].cost, Money::from_units(300));
        assert_eq!(rows[0].profit, Money::from_units(200));
        // p-2 ties p-1 on revenue and sorts after it by id
        assert_eq!(rows[1].product_id, "p-2");
    }
}
