//! Headline financial figures for a set of records.

use serde::{Deserialize, Serialize};

use super::{cost_of_goods_sold, outstanding_credit, total_expenses, total_revenue};
use crate::money::Money;
use crate::types::{Credit, Expense, Transaction};

/// Revenue, cost, profit and credit totals.
///
/// ```text
///   total_revenue        Σ totalAmount
/// − cost_of_goods_sold   Σ transaction_cost
/// = gross_profit                               profit_margin     = gross / revenue
/// − total_expenses       Σ expense amount
/// = net_profit                                 net_profit_margin = net / revenue
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_revenue: Money,
    pub cost_of_goods_sold: Money,
    pub gross_profit: Money,
    pub total_expenses: Money,
    pub net_profit: Money,
    /// Gross margin, percent.
    pub profit_margin: f64,
    pub net_profit_margin: f64,
    pub transaction_count: usize,
    pub average_transaction_value: Money,
    /// Σ totalAmount of credit sales.
    pub credit_sales: Money,
    pub outstanding_credit: Money,
    /// Collected / given, percent.
    pub credit_collection_rate: f64,
}

impl FinancialSummary {
    pub fn compute(transactions: &[Transaction], credits: &[Credit], expenses: &[Expense]) -> Self {
        let total_revenue = total_revenue(transactions);
        let cost_of_goods_sold = cost_of_goods_sold(transactions);
        let gross_profit = total_revenue - cost_of_goods_sold;
        let total_expenses = total_expenses(expenses);
        let net_profit = gross_profit - total_expenses;

        let credit_given: Money = credits.iter().map(|c| c.total_amount).sum();
        let credit_collected: Money = credits.iter().map(|c| c.amount_paid).sum();

        FinancialSummary {
            total_revenue,
            cost_of_goods_sold,
            gross_profit,
            total_expenses,
            net_profit,
            profit_margin: gross_profit.percent_of(total_revenue),
            net_profit_margin: net_profit.percent_of(total_revenue),
            transaction_count: transactions.len(),
            average_transaction_value: total_revenue.average_over(transactions.len()),
            credit_sales: transactions
                .iter()
                .filter(|t| t.is_credit())
                .map(|t| t.total_amount)
                .sum(),
            outstanding_credit: outstanding_credit(credits),
            credit_collection_rate: credit_collected.percent_of(credit_given),
        }
    }
}
