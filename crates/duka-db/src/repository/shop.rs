//! # Shop Repository

use std::collections::HashMap;

use chrono::Utc;
use duka_core::Shop;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const SHOP_COLUMNS: &str = "id, name, location, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// All shops, by name.
    pub async fn list(&self) -> DbResult<Vec<Shop>> {
        let shops = sqlx::query_as::<_, Shop>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(shops)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shop>> {
        let shop = sqlx::query_as::<_, Shop>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shop)
    }

    /// `Err(DbError::UniqueViolation)` when the name is taken.
    pub async fn insert(&self, shop: &Shop) -> DbResult<()> {
        debug!(id = %shop.id, name = %shop.name, "Inserting shop");

        sqlx::query(
            "INSERT INTO shops (id, name, location, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&shop.id)
        .bind(&shop.name)
        .bind(&shop.location)
        .bind(shop.created_at)
        .bind(shop.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&shop.name))?;

        Ok(())
    }

    /// Updates name and location; `updated_at` is set here.
    pub async fn update(&self, shop: &Shop) -> DbResult<Shop> {
        debug!(id = %shop.id, "Updating shop");

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE shops SET name = ?2, location = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(&shop.id)
        .bind(&shop.name)
        .bind(&shop.location)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&shop.name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", &shop.id));
        }

        Ok(Shop {
            updated_at: now,
            ..shop.clone()
        })
    }

    /// Fails with a foreign key violation while products, cashiers or sales
    /// still reference the shop.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting shop");

        let result = sqlx::query("DELETE FROM shops WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shop", id));
        }
        Ok(())
    }

    /// id → name, for labelling report rows.
    pub async fn names(&self) -> DbResult<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT id, name FROM shops")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;

    #[tokio::test]
    async fn test_shop_crud() {
        let db = test_support::database().await;
        let mut shop = test_support::shop(&db, "Westlands").await;

        let loaded = db.shops().get_by_id(&shop.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Westlands");

        shop.name = "Westlands Branch".to_string();
        db.shops().update(&shop).await.unwrap();
        let names = db.shops().names().await.unwrap();
        assert_eq!(names.get(&shop.id).map(String::as_str), Some("Westlands Branch"));

        db.shops().delete(&shop.id).await.unwrap();
        assert!(db.shops().get_by_id(&shop.id).await.unwrap().is_none());
        assert!(matches!(
            db.shops().delete(&shop.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_shop_name() {
        let db = test_support::database().await;
        let first = test_support::shop(&db, "Kilimani").await;

        let mut dup = first.clone();
        dup.id = uuid::Uuid::new_v4().to_string();
        dup.name = "kilimani".to_string();

        let err = db.shops().insert(&dup).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "kilimani"));
    }

    #[tokio::test]
    async fn test_delete_shop_in_use() {
        let db = test_support::database().await;
        let shop = test_support::shop(&db, "Thika Road").await;
        test_support::product(&db, &shop, "Sugar 1kg", 5).await;

        assert!(matches!(
            db.shops().delete(&shop.id).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }
}
