//! # Cashier Repository
//!
//! Cashier accounts. The password hash lives only in this table and is
//! returned only through [`CashierRepository::find_credentials`].

use std::collections::HashMap;

use chrono::Utc;
use duka_core::Cashier;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

const CASHIER_COLUMNS: &str =
    "id, shop_id, name, email, phone, is_active, created_at, updated_at";

#[derive(FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    cashier: Cashier,
    password_hash: String,
}

#[derive(Debug, Clone)]
pub struct CashierRepository {
    pool: SqlitePool,
}

impl CashierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashierRepository { pool }
    }

    /// Cashiers by name, optionally limited to one shop.
    pub async fn list(&self, shop_id: Option<&str>) -> DbResult<Vec<Cashier>> {
        let cashiers = sqlx::query_as::<_, Cashier>(&format!(
            "SELECT {CASHIER_COLUMNS} FROM cashiers
             WHERE (?1 IS NULL OR shop_id = ?1)
             ORDER BY name"
        ))
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(cashiers)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Cashier>> {
        let cashier = sqlx::query_as::<_, Cashier>(&format!(
            "SELECT {CASHIER_COLUMNS} FROM cashiers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cashier)
    }

    /// Cashier and password hash for a login attempt. Email is case-insensitive.
    pub async fn find_credentials(&self, email: &str) -> DbResult<Option<(Cashier, String)>> {
        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {CASHIER_COLUMNS}, password_hash FROM cashiers WHERE email = ?1"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| (r.cashier, r.password_hash)))
    }

    /// `Err(DbError::UniqueViolation)` when the email is taken,
    /// `Err(DbError::ForeignKeyViolation)` when the shop does not exist.
    pub async fn insert(&self, cashier: &Cashier, password_hash: &str) -> DbResult<()> {
        debug!(id = %cashier.id, shop_id = %cashier.shop_id, "Inserting cashier");

        sqlx::query(
            "INSERT INTO cashiers (
                id, shop_id, name, email, phone, password_hash,
                is_active, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&cashier.id)
        .bind(&cashier.shop_id)
        .bind(&cashier.name)
        .bind(&cashier.email)
        .bind(&cashier.phone)
        .bind(password_hash)
        .bind(cashier.is_active)
        .bind(cashier.created_at)
        .bind(cashier.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&cashier.email))?;

        Ok(())
    }

    /// Updates profile fields and the active flag.
    pub async fn update(&self, cashier: &Cashier) -> DbResult<Cashier> {
        debug!(id = %cashier.id, "Updating cashier");

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE cashiers SET
                shop_id = ?2, name = ?3, email = ?4, phone = ?5,
                is_active = ?6, updated_at = ?7
             WHERE id = ?1",
        )
        .bind(&cashier.id)
        .bind(&cashier.shop_id)
        .bind(&cashier.name)
        .bind(&cashier.email)
        .bind(&cashier.phone)
        .bind(cashier.is_active)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&cashier.email))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cashier", &cashier.id));
        }

        Ok(Cashier {
            updated_at: now,
            ..cashier.clone()
        })
    }

    pub async fn set_password(&self, id: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE cashiers SET password_hash = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cashier", id));
        }
        Ok(())
    }

    /// Fails with a foreign key violation once the cashier has sales;
    /// deactivate instead.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting cashier");

        let result = sqlx::query("DELETE FROM cashiers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cashier", id));
        }
        Ok(())
    }

    /// id → name, for labelling report rows.
    pub async fn names(&self) -> DbResult<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT id, name FROM cashiers")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }
}
