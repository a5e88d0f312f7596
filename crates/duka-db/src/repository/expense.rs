//! # Expense Repository
//!
//! Operating expenses. An expense with no shop is business-wide and is left
//! out whenever a shop filter applies.

use duka_core::{Expense, RecordFilter};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{push_filter, FilterColumns};
use crate::error::{DbError, DbResult};

const EXPENSE_COLUMNS: &str =
    "id, shop_id, category, description, amount, expense_date, created_at";

const FILTER: FilterColumns = FilterColumns {
    day: "expense_date",
    shop: "shop_id",
    cashier: None,
};

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Expenses within the filter, newest first. The cashier part of the
    /// filter does not apply to expenses.
    pub async fn list(&self, filter: &RecordFilter) -> DbResult<Vec<Expense>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE 1 = 1"));
        push_filter(&mut qb, filter, &FILTER);
        qb.push(" ORDER BY expense_date DESC, created_at DESC");

        let expenses = qb.build_query_as::<Expense>().fetch_all(&self.pool).await?;

        debug!(count = expenses.len(), "Listed expenses");
        Ok(expenses)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    pub async fn insert(&self, expense: &Expense) -> DbResult<()> {
        debug!(id = %expense.id, category = %expense.category, "Inserting expense");

        sqlx::query(
            "INSERT INTO expenses (id, shop_id, category, description, amount, expense_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&expense.id)
        .bind(&expense.shop_id)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.expense_date)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn update(&self, expense: &Expense) -> DbResult<()> {
        debug!(id = %expense.id, "Updating expense");

        let result = sqlx::query(
            "UPDATE expenses SET
                shop_id = ?2, category = ?3, description = ?4, amount = ?5, expense_date = ?6
             WHERE id = ?1",
        )
        .bind(&expense.id)
        .bind(&expense.shop_id)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.expense_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", &expense.id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting expense");

        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }
        Ok(())
    }
}
