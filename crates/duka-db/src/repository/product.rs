//! # Product Repository
//!
//! Catalog CRUD and stock movements.
//!
//! ## Stock Movements
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where current_stock changes                          │
//! │                                                                         │
//! │  Sale recorded ───────► TransactionRepository::record_sale              │
//! │                         (decrement, inside the sale's DB transaction)  │
//! │                                                                         │
//! │  Restock / count ─────► ProductRepository::adjust_stock (± delta)       │
//! │                                                                         │
//! │  Edit product ────────► ProductRepository::update (absolute value)      │
//! │                                                                         │
//! │  Stock can never go below zero: the guarded UPDATE matches no row and   │
//! │  the caller gets InsufficientStock.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use duka_core::{CoreError, Product};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

pub(crate) const PRODUCT_COLUMNS: &str = "id, shop_id, name, category, buying_price, \
     min_selling_price, current_stock, min_stock_level, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Products by name, optionally limited to one shop.
    pub async fn list(&self, shop_id: Option<&str>) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE (?1 IS NULL OR shop_id = ?1)
             ORDER BY name"
        ))
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Products at or below their reorder level, lowest stock first.
    pub async fn low_stock(&self, shop_id: Option<&str>) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE current_stock <= min_stock_level
               AND (?1 IS NULL OR shop_id = ?1)
             ORDER BY current_stock, name"
        ))
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// `Err(DbError::UniqueViolation)` when the shop already has a product
    /// with this name.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, shop_id = %product.shop_id, "Inserting product");

        sqlx::query(
            "INSERT INTO products (
                id, shop_id, name, category, buying_price, min_selling_price,
                current_stock, min_stock_level, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&product.id)
        .bind(&product.shop_id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.buying_price)
        .bind(product.min_selling_price)
        .bind(product.current_stock)
        .bind(product.min_stock_level)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&product.name))?;

        Ok(())
    }

    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE products SET
                shop_id = ?2, name = ?3, category = ?4,
                buying_price = ?5, min_selling_price = ?6,
                current_stock = ?7, min_stock_level = ?8, updated_at = ?9
             WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.shop_id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.buying_price)
        .bind(product.min_selling_price)
        .bind(product.current_stock)
        .bind(product.min_stock_level)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&product.name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(Product {
            updated_at: now,
            ..product.clone()
        })
    }

    /// Adds `delta` (negative to remove) to the stock count.
    ///
    /// Returns the updated product; refuses to go below zero.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta = delta, "Adjusting stock");

        let result = sqlx::query(
            "UPDATE products SET current_stock = current_stock + ?2, updated_at = ?3
             WHERE id = ?1 AND current_stock + ?2 >= 0",
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InsufficientStock {
                product: product.name,
                available: product.current_stock,
                requested: -delta,
            }
            .into());
        }

        Ok(product)
    }

    /// Historic sales keep their item snapshots.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }
}
