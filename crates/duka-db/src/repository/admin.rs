//! # Admin Repository

use duka_core::Admin;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    admin: Admin,
    password_hash: String,
}

#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AdminRepository { pool }
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, name, email, created_at FROM admins WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Admin and password hash for a login attempt. Email is case-insensitive.
    pub async fn find_credentials(&self, email: &str) -> DbResult<Option<(Admin, String)>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, name, email, created_at, password_hash FROM admins WHERE email = ?1",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| (r.admin, r.password_hash)))
    }

    pub async fn insert(&self, admin: &Admin, password_hash: &str) -> DbResult<()> {
        debug!(id = %admin.id, "Inserting admin");

        sqlx::query(
            "INSERT INTO admins (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&admin.id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(password_hash)
        .bind(admin.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_value(&admin.email))?;

        Ok(())
    }
}
