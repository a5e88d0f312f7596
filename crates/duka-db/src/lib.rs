//! # duka-db: Database Layer for Duka POS
//!
//! SQLite storage for shops, staff, catalog, sales, credit and expenses,
//! built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka POS Data Flow                               │
//! │                                                                         │
//! │  axum handler (POST /api/transactions, GET /api/reports/...)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     duka-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │   │   │
//! │  │   │               │    │ Shop, Cashier  │   │              │   │   │
//! │  │   │ SqlitePool    │◄───│ Product, Admin │   │ 001_initial_ │   │   │
//! │  │   │ WAL, FKs on   │    │ Transaction    │   │   schema.sql │   │   │
//! │  │   │               │    │ Credit, Expense│   │              │   │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (database.path in duka.toml)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table family
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duka_core::RecordFilter;
//! use duka_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./duka.db")).await?;
//! let sales = db.transactions().list(&RecordFilter::new().with_shop(shop_id)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::{
    AdminRepository, CashierRepository, CreditRepository, ExpenseRepository, ProductRepository,
    ShopRepository, TransactionRepository,
};
