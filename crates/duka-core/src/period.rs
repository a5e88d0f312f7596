//! # Report Periods & Record Filters
//!
//! Date-range, shop and cashier filtering shared by every report.
//!
//! ## Inclusive Ranges
//! ```text
//!   start = 2024-03-01, end = 2024-03-31
//!
//!   2024-02-29 23:59  ✗
//!   2024-03-01 00:00  ✓   ← start day included
//!   2024-03-31 23:59  ✓   ← end day included (whole day)
//!   2024-04-01 00:00  ✗
//! ```
//!
//! Ranges compare calendar days, never instants, so a sale at 23:59 on the
//! end date is always inside the range.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::{Credit, Expense, Transaction};
use crate::validation::ValidationResult;

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range; `start` must not be after `end`.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use duka_core::period::DateRange;
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
    /// let range = DateRange::new(d(1), d(31)).unwrap();
    ///
    /// assert!(range.contains(d(1)));
    /// assert!(range.contains(d(31)));
    /// assert!(DateRange::new(d(31), d(1)).is_err());
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> ValidationResult<Self> {
        if start > end {
            return Err(ValidationError::InvertedRange {
                field: "date range".to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    /// A range covering one day.
    pub fn single_day(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive on both ends.
    #[inline]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Whether the instant falls on a day inside the range (UTC days).
    #[inline]
    pub fn contains_instant(&self, at: DateTime<Utc>) -> bool {
        self.contains(at.date_naive())
    }

    /// Number of days covered, counting both ends.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterates every day in the range in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

// =============================================================================
// Period Presets
// =============================================================================

/// Named periods offered by the report screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    Yesterday,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    ThisWeek,
    ThisMonth,
    LastMonth,
    ThisYear,
    /// No date restriction.
    All,
}

impl Period {
    pub const ALL_PERIODS: [Period; 9] = [
        Period::Today,
        Period::Yesterday,
        Period::Last7Days,
        Period::Last30Days,
        Period::ThisWeek,
        Period::ThisMonth,
        Period::LastMonth,
        Period::ThisYear,
        Period::All,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Yesterday => "yesterday",
            Period::Last7Days => "last_7_days",
            Period::Last30Days => "last_30_days",
            Period::ThisWeek => "this_week",
            Period::ThisMonth => "this_month",
            Period::LastMonth => "last_month",
            Period::ThisYear => "this_year",
            Period::All => "all",
        }
    }

    /// Resolves the preset relative to `today`. `All` has no range.
    ///
    /// Weeks start on Monday. "Last N days" includes today.
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use duka_core::period::Period;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(); // Thursday
    /// let week = Period::ThisWeek.resolve(today).unwrap();
    /// assert_eq!(week.start(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    /// assert_eq!(week.end(), today);
    /// ```
    pub fn resolve(&self, today: NaiveDate) -> Option<DateRange> {
        let range = |start: NaiveDate, end: NaiveDate| DateRange { start, end };

        match self {
            Period::Today => Some(DateRange::single_day(today)),
            Period::Yesterday => Some(DateRange::single_day(today - Duration::days(1))),
            Period::Last7Days => Some(range(today - Duration::days(6), today)),
            Period::Last30Days => Some(range(today - Duration::days(29), today)),
            Period::ThisWeek => {
                let offset = today.weekday().num_days_from_monday() as i64;
                Some(range(today - Duration::days(offset), today))
            }
            Period::ThisMonth => Some(range(first_of_month(today), today)),
            Period::LastMonth => {
                let end = first_of_month(today) - Duration::days(1);
                Some(range(first_of_month(end), end))
            }
            Period::ThisYear => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                Some(range(start, today))
            }
            Period::All => None,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::All
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Period::ALL_PERIODS
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "period".to_string(),
                allowed: Period::ALL_PERIODS
                    .iter()
                    .map(|p| p.as_str().to_string())
                    .collect(),
            })
    }
}

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

// =============================================================================
// Record Filter
// =============================================================================

/// The date / shop / cashier filter every report screen applies.
///
/// Empty filter matches everything.
///
/// ## Field Mapping
/// | record       | date used      | shop      | cashier    |
/// |--------------|----------------|-----------|------------|
/// | Transaction  | sale_date      | shop_id   | cashier_id |
/// | Credit       | created_at     | shop_id   | cashier_id |
/// | Expense      | expense_date   | shop_id   | (ignored)  |
///
/// Business-wide expenses (no shop) are excluded once a shop is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFilter {
    pub range: Option<DateRange>,
    pub shop_id: Option<String>,
    pub cashier_id: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: Option<DateRange>) -> Self {
        self.range = range;
        self
    }

    pub fn with_shop(mut self, shop_id: impl Into<String>) -> Self {
        self.shop_id = Some(shop_id.into());
        self
    }

    pub fn with_cashier(mut self, cashier_id: impl Into<String>) -> Self {
        self.cashier_id = Some(cashier_id.into());
        self
    }

    fn day_matches(&self, day: NaiveDate) -> bool {
        self.range.map_or(true, |r| r.contains(day))
    }

    fn id_matches(wanted: &Option<String>, actual: &str) -> bool {
        wanted.as_deref().map_or(true, |w| w == actual)
    }

    pub fn matches_transaction(&self, t: &Transaction) -> bool {
        self.day_matches(t.sale_day())
            && Self::id_matches(&self.shop_id, &t.shop_id)
            && Self::id_matches(&self.cashier_id, &t.cashier_id)
    }

    pub fn matches_credit(&self, c: &Credit) -> bool {
        self.day_matches(c.created_at.date_naive())
            && Self::id_matches(&self.shop_id, &c.shop_id)
            && Self::id_matches(&self.cashier_id, &c.cashier_id)
    }

    pub fn matches_expense(&self, e: &Expense) -> bool {
        let shop_ok = match (&self.shop_id, &e.shop_id) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => wanted == actual,
            (Some(_), None) => false,
        };
        self.day_matches(e.expense_date) && shop_ok
    }

    pub fn transactions(&self, records: &[Transaction]) -> Vec<Transaction> {
        records
            .iter()
            .filter(|t| self.matches_transaction(t))
            .cloned()
            .collect()
    }

    pub fn credits(&self, records: &[Credit]) -> Vec<Credit> {
        records
            .iter()
            .filter(|c| self.matches_credit(c))
            .cloned()
            .collect()
    }

    pub fn expenses(&self, records: &[Expense]) -> Vec<Expense> {
        records
            .iter()
            .filter(|e| self.matches_expense(e))
            .cloned()
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
