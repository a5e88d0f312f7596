//! Credit book summary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::outstanding_credit;
use crate::money::Money;
use crate::types::{Credit, CreditStatus};

/// Totals and status counts for a set of credits.
///
/// Status counts use [`Credit::effective_status`], so an unpaid credit past
/// its due date counts as overdue even if never marked so.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSummary {
    pub credit_count: usize,
    pub total_credit_given: Money,
    pub amount_collected: Money,
    pub outstanding: Money,
    /// Collected / given, percent.
    pub collection_rate: f64,
    pub pending_count: usize,
    pub partially_paid_count: usize,
    pub paid_count: usize,
    pub overdue_count: usize,
    pub overdue_amount: Money,
}

impl CreditSummary {
    pub fn compute(credits: &[Credit], today: NaiveDate) -> Self {
        let mut summary = CreditSummary {
            credit_count: credits.len(),
            outstanding: outstanding_credit(credits),
            ..CreditSummary::default()
        };

        for credit in credits {
            summary.total_credit_given += credit.total_amount;
            summary.amount_collected += credit.amount_paid;

            match credit.effective_status(today) {
                CreditStatus::Pending => summary.pending_count += 1,
                CreditStatus::PartiallyPaid => summary.partially_paid_count += 1,
                CreditStatus::Paid => summary.paid_count += 1,
                CreditStatus::Overdue => {
                    summary.overdue_count += 1;
                    summary.overdue_amount += credit.balance_due;
                }
            }
        }

        summary.collection_rate = summary
            .amount_collected
            .percent_of(summary.total_credit_given);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::credit;
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    #[test]
    fn test_no_credit_given_rate_is_zero() {
        let s = CreditSummary::compute(&[], today());
        assert_eq!(s, CreditSummary::default());
        assert_eq!(s.collection_rate, 0.0);
    }

    #[test]
    fn test_fully_collected_rate_is_hundred() {
        let credits = vec![
            credit(1000, 1000, CreditStatus::Paid),
            credit(250, 250, CreditStatus::Paid),
        ];
        let s = CreditSummary::compute(&credits, today());

        assert_eq!(s.collection_rate, 100.0);
        assert_eq!(s.outstanding, Money::zero());
        assert_eq!(s.paid_count, 2);
    }

    #[test]
    fn test_status_counts_and_overdue() {
        let mut late = credit(800, 200, CreditStatus::PartiallyPaid);
        late.due_date = NaiveDate::from_ymd_opt(2024, 3, 19);

        let mut due_today = credit(400, 0, CreditStatus::Pending);
        due_today.due_date = Some(today());

        let mut marked = credit(100, 0, CreditStatus::Overdue);
        marked.id = "c-marked".to_string();

        let credits = vec![
            late,
            due_today,
            marked,
            credit(300, 300, CreditStatus::Paid),
        ];
        let s = CreditSummary::compute(&credits, today());

        assert_eq!(s.credit_count, 4);
        assert_eq!(s.total_credit_given, Money::from_units(1600));
        assert_eq!(s.amount_collected, Money::from_units(500));
        assert_eq!(s.outstanding, Money::from_units(1100));
        assert_eq!(s.pending_count, 1);
        assert_eq!(s.partially_paid_count, 0);
        assert_eq!(s.paid_count, 1);
        assert_eq!(s.overdue_count, 2);
        assert_eq!(s.overdue_amount, Money::from_units(700));
        assert_eq!(s.collection_rate, 31.25);
    }
}
