//! # Repository Module
//!
//! Database repository implementations for Duka POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  db.transactions().list(&filter)                               │
//! │       ▼                                                                 │
//! │  TransactionRepository                                                 │
//! │  ├── list(&self, filter)        ← RecordFilter → WHERE clause          │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── record_sale(&self, draft)  ← one SQLite transaction               │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked, bound parameters only)                  │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`AdminRepository`] - Admin accounts and credentials
//! - [`ShopRepository`] - Shop CRUD
//! - [`CashierRepository`] - Cashier CRUD and credentials
//! - [`ProductRepository`] - Catalog CRUD and stock adjustment
//! - [`TransactionRepository`] - Sales with items, atomic recording
//! - [`CreditRepository`] - Credit book and repayments
//! - [`ExpenseRepository`] - Expense CRUD

pub mod admin;
pub mod cashier;
pub mod credit;
pub mod expense;
pub mod product;
pub mod shop;
pub mod transaction;

pub use admin::AdminRepository;
pub use cashier::CashierRepository;
pub use credit::CreditRepository;
pub use expense::ExpenseRepository;
pub use product::ProductRepository;
pub use shop::ShopRepository;
pub use transaction::TransactionRepository;

use duka_core::RecordFilter;
use sqlx::{QueryBuilder, Sqlite};

/// Where a table keeps the columns a [`RecordFilter`] looks at.
pub(crate) struct FilterColumns {
    /// SQL expression yielding `YYYY-MM-DD`.
    pub day: &'static str,
    pub shop: &'static str,
    /// `None` for tables without a cashier (expenses).
    pub cashier: Option<&'static str>,
}

/// Appends `AND ...` conditions for the filter. The query must already have
/// a `WHERE` clause (`WHERE 1 = 1` is fine).
pub(crate) fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &RecordFilter, cols: &FilterColumns) {
    if let Some(range) = filter.range {
        qb.push(" AND ")
            .push(cols.day)
            .push(" BETWEEN ")
            .push_bind(range.start().to_string())
            .push(" AND ")
            .push_bind(range.end().to_string());
    }

    if let Some(shop_id) = &filter.shop_id {
        qb.push(" AND ")
            .push(cols.shop)
            .push(" = ")
            .push_bind(shop_id.clone());
    }

    if let (Some(column), Some(cashier_id)) = (cols.cashier, &filter.cashier_id) {
        qb.push(" AND ")
            .push(column)
            .push(" = ")
            .push_bind(cashier_id.clone());
    }
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use duka_core::{Cashier, Money, Product, Shop};
    use uuid::Uuid;

    use crate::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn shop(db: &Database, name: &str) -> Shop {
        let now = Utc::now();
        let shop = Shop {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            location: Some("Nairobi".to_string()),
            created_at: now,
            updated_at: now,
        };
        db.shops().insert(&shop).await.unwrap();
        shop
    }

    pub async fn cashier(db: &Database, shop: &Shop, email: &str) -> Cashier {
        let now = Utc::now();
        let cashier = Cashier {
            id: Uuid::new_v4().to_string(),
            shop_id: shop.id.clone(),
            name: "Amina".to_string(),
            email: email.to_string(),
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.cashiers().insert(&cashier, "hash").await.unwrap();
        cashier
    }

    pub async fn product(db: &Database, shop: &Shop, name: &str, stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            shop_id: shop.id.clone(),
            name: name.to_string(),
            category: Some("Groceries".to_string()),
            buying_price: Money::from_units(80),
            min_selling_price: Money::from_units(100),
            current_stock: stock,
            min_stock_level: 2,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }
}
