//! # duka-core: Pure Business Logic for Duka POS
//!
//! Everything Duka POS knows about money, sales, credit and reporting, as
//! pure functions with zero I/O dependencies.
//!
//! ## Where it sits
//! ```text
//!  POS till / admin dashboard
//!            │ JSON over HTTP
//!            ▼
//!  apps/api (axum) ──► duka-db (SQLite) ──┐
//!            │                            │ rows
//!            ▼                            ▼
//!  duka-core: Money, Cart, DateRange, FinancialSummary ...
//! ```
//!
//! Nothing here reads the clock, the disk or the network. Callers pass in
//! `today` and the records, and get numbers back.
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Shop, Product, Transaction, Credit, Expense)
//! - [`money`] - Money type with integer arithmetic
//! - [`numeric`] - Coercion of malformed numeric input to zero
//! - [`period`] - Inclusive date ranges, period presets, record filters
//! - [`cart`] - Cashier cart and checkout rules
//! - [`analytics`] - Financial aggregation behind every report
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use duka_core::analytics::FinancialSummary;
//!
//! let summary = FinancialSummary::compute(&[], &[], &[]);
//! assert_eq!(summary.transaction_count, 0);
//! assert_eq!(summary.profit_margin, 0.0);
//! ```

pub mod analytics;
pub mod cart;
pub mod error;
pub mod money;
pub mod numeric;
pub mod period;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use period::{DateRange, Period, RecordFilter};
pub use types::*;

/// Lines per sale.
pub const MAX_CART_ITEMS: usize = 100;

/// Units per line; a till operator typing 1000 for 10 gets stopped here.
pub const MAX_ITEM_QUANTITY: i64 = 999;
