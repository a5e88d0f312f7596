//! # Report Loading
//!
//! Turns report query parameters into a [`RecordFilter`], loads the matching
//! records and hands them to `duka_core::analytics`.
//!
//! ```text
//! ?period=this_month&shop_id=..   ─► ReportQuery::filter(today)
//!                                         │
//!                                         ▼
//!                                   RecordFilter
//!                                         │  ReportData::load(db, filter)
//!                                         ▼
//!        transactions + items, credits, expenses, products (shop only)
//!                                         │
//!                                         ▼
//!                         analytics::* / UnifiedReport::compute
//! ```

use chrono::{NaiveDate, Utc};
use duka_core::analytics::{label_rows, UnifiedReport};
use duka_core::validation::parse_date;
use duka_core::{
    Credit, DateRange, Expense, Period, Product, RecordFilter, Transaction, ValidationError,
};
use duka_db::Database;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiResult;

/// Query string accepted by every report endpoint and by the list endpoints
/// that filter records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
    /// YYYY-MM-DD, inclusive; overrides `period`.
    pub start: Option<String>,
    /// YYYY-MM-DD, inclusive; defaults to today when only `start` is given.
    pub end: Option<String>,
    pub shop_id: Option<String>,
    pub cashier_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ReportQuery {
    /// Resolves the query against `today`.
    ///
    /// ## Rules
    /// - `start` (with optional `end`) wins over `period`
    /// - `end` without `start` is rejected
    /// - no dates and no period means all time
    /// - blank ids are ignored
    pub fn filter(&self, today: NaiveDate) -> ApiResult<RecordFilter> {
        let range = match (non_blank(&self.start), non_blank(&self.end)) {
            (Some(start), end) => {
                let start = parse_date("start", start)?;
                let end = match end {
                    Some(end) => parse_date("end", end)?,
                    None => today.max(start),
                };
                Some(DateRange::new(start, end)?)
            }
            (None, Some(_)) => {
                return Err(ValidationError::Required {
                    field: "start".to_string(),
                }
                .into())
            }
            (None, None) => {
                let period = match non_blank(&self.period) {
                    Some(p) => p.parse::<Period>()?,
                    None => Period::All,
                };
                period.resolve(today)
            }
        };

        let mut filter = RecordFilter::new().with_range(range);
        if let Some(shop_id) = non_blank(&self.shop_id) {
            filter = filter.with_shop(shop_id);
        }
        if let Some(cashier_id) = non_blank(&self.cashier_id) {
            filter = filter.with_cashier(cashier_id);
        }
        Ok(filter)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Records behind one report.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub transactions: Vec<Transaction>,
    pub credits: Vec<Credit>,
    pub expenses: Vec<Expense>,
    /// Current catalog; only the shop part of the filter applies.
    pub products: Vec<Product>,
}

impl ReportData {
    pub async fn load(db: &Database, filter: &RecordFilter) -> ApiResult<Self> {
        let transactions = db.transactions().list(filter).await?;
        let credits = db.credits().list(filter, None).await?;
        let expenses = db.expenses().list(filter).await?;
        let products = db.products().list(filter.shop_id.as_deref()).await?;

        debug!(
            transactions = transactions.len(),
            credits = credits.len(),
            expenses = expenses.len(),
            products = products.len(),
            "Report data loaded"
        );

        Ok(ReportData {
            transactions,
            credits,
            expenses,
            products,
        })
    }
}

/// Every report section for one filter, with shop and cashier names filled in.
pub async fn unified_report(db: &Database, filter: &RecordFilter) -> ApiResult<UnifiedReport> {
    let data = ReportData::load(db, filter).await?;
    let today = Utc::now().date_naive();

    let mut report = UnifiedReport::compute(
        filter.range,
        &data.transactions,
        &data.credits,
        &data.expenses,
        &data.products,
        today,
    );

    label_rows(&mut report.shops, &db.shops().names().await?);
    label_rows(&mut report.cashiers, &db.cashiers().names().await?);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn query(period: Option<&str>, start: Option<&str>, end: Option<&str>) -> ReportQuery {
        ReportQuery {
            period: period.map(str::to_string),
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            ..ReportQuery::default()
        }
    }

    #[test]
    fn test_explicit_dates_override_period() {
        let filter = query(Some("today"), Some("2024-03-01"), Some("2024-03-31"))
            .filter(day(2024, 6, 1))
            .unwrap();
        let range = filter.range.unwrap();
        assert_eq!(range.start(), day(2024, 3, 1));
        assert_eq!(range.end(), day(2024, 3, 31));
    }

    #[test]
    fn test_start_only_runs_to_today() {
        let filter = query(None, Some("2024-05-20"), None)
            .filter(day(2024, 6, 1))
            .unwrap();
        assert_eq!(filter.range.unwrap().end(), day(2024, 6, 1));
    }

    #[test]
    fn test_period_and_default() {
        let filter = query(Some("yesterday"), None, None)
            .filter(day(2024, 6, 1))
            .unwrap();
        assert_eq!(filter.range, Some(DateRange::single_day(day(2024, 5, 31))));

        let filter = query(None, None, None).filter(day(2024, 6, 1)).unwrap();
        assert_eq!(filter.range, None);
    }

    #[test]
    fn test_invalid_queries() {
        let today = day(2024, 6, 1);
        for q in [
            query(Some("fortnight"), None, None),
            query(None, Some("2024-13-01"), None),
            query(None, None, Some("2024-05-01")),
            query(None, Some("2024-05-10"), Some("2024-05-01")),
        ] {
            assert_eq!(q.filter(today).unwrap_err().code, ErrorCode::ValidationError);
        }
    }

    #[test]
    fn test_blank_ids_ignored() {
        let q = ReportQuery {
            shop_id: Some("  ".to_string()),
            cashier_id: Some("k-1".to_string()),
            ..ReportQuery::default()
        };
        let filter = q.filter(day(2024, 6, 1)).unwrap();
        assert_eq!(filter.shop_id, None);
        assert_eq!(filter.cashier_id.as_deref(), Some("k-1"));
    }
}
