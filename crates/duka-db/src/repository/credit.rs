//! # Credit Repository
//!
//! Receivables from credit sales and their repayments.
//!
//! A credit row is written together with its sale by
//! [`TransactionRepository::record_sale`](super::TransactionRepository::record_sale);
//! this repository reads credits and records repayments.
//!
//! ## Concurrent Repayments
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  read credit ──► apply_payment (duka-core rules) ──► guarded UPDATE     │
//! │                                                                         │
//! │  UPDATE credits SET ... WHERE id = ? AND balance_due = <balance read>   │
//! │                                                                         │
//! │  Two tills paying the same credit: the second UPDATE matches no row,    │
//! │  its transaction rolls back and the caller gets DbError::Conflict.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use duka_core::{Credit, CreditPayment, CreditStatus, Money, PaymentMethod, RecordFilter};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{push_filter, FilterColumns};
use crate::error::{DbError, DbResult};

const CREDIT_COLUMNS: &str = "id, transaction_id, shop_id, cashier_id, customer_name, \
     customer_phone, total_amount, amount_paid, balance_due, status, due_date, \
     created_at, updated_at";

const FILTER: FilterColumns = FilterColumns {
    day: "substr(created_at, 1, 10)",
    shop: "shop_id",
    cashier: Some("cashier_id"),
};

/// Writes a credit row on an open connection or transaction.
pub(crate) async fn insert_credit(conn: &mut SqliteConnection, credit: &Credit) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO credits (
            id, transaction_id, shop_id, cashier_id, customer_name, customer_phone,
            total_amount, amount_paid, balance_due, status, due_date, created_at, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )
    .bind(&credit.id)
    .bind(&credit.transaction_id)
    .bind(&credit.shop_id)
    .bind(&credit.cashier_id)
    .bind(&credit.customer_name)
    .bind(&credit.customer_phone)
    .bind(credit.total_amount)
    .bind(credit.amount_paid)
    .bind(credit.balance_due)
    .bind(credit.status)
    .bind(credit.due_date)
    .bind(credit.created_at)
    .bind(credit.updated_at)
    .execute(&mut *conn)
    .await?;

    debug!(id = %credit.id, balance = %credit.balance_due, "Credit opened");
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// Credits opened within the filter, newest first, optionally by stored
    /// status.
    pub async fn list(
        &self,
        filter: &RecordFilter,
        status: Option<CreditStatus>,
    ) -> DbResult<Vec<Credit>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {CREDIT_COLUMNS} FROM credits WHERE 1 = 1"));
        push_filter(&mut qb, filter, &FILTER);
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC, id");

        let credits = qb.build_query_as::<Credit>().fetch_all(&self.pool).await?;

        debug!(count = credits.len(), "Listed credits");
        Ok(credits)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Credit>> {
        let credit = sqlx::query_as::<_, Credit>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credits WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credit)
    }

    /// Repayments against a credit, oldest first.
    pub async fn payments(&self, credit_id: &str) -> DbResult<Vec<CreditPayment>> {
        let payments = sqlx::query_as::<_, CreditPayment>(
            "SELECT id, credit_id, amount, payment_method, cashier_id, paid_at
             FROM credit_payments WHERE credit_id = ?1
             ORDER BY paid_at, id",
        )
        .bind(credit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Records a repayment and returns the updated credit with the stored
    /// payment.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown credit
    /// - `Core(..)` when the amount breaks the repayment rules
    /// - `Conflict` when another repayment landed first
    pub async fn record_payment(
        &self,
        credit_id: &str,
        amount: Money,
        method: PaymentMethod,
        cashier_id: Option<&str>,
    ) -> DbResult<(Credit, CreditPayment)> {
        debug!(credit_id = %credit_id, amount = %amount, "Recording credit payment");

        let mut tx = self.pool.begin().await?;

        let mut credit = sqlx::query_as::<_, Credit>(&format!(
            "SELECT {CREDIT_COLUMNS} FROM credits WHERE id = ?1"
        ))
        .bind(credit_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Credit", credit_id))?;

        let previous_balance = credit.balance_due;
        let now = Utc::now();
        credit.apply_payment(amount, now)?;

        let updated = sqlx::query(
            "UPDATE credits SET amount_paid = ?2, balance_due = ?3, status = ?4, updated_at = ?5
             WHERE id = ?1 AND balance_due = ?6",
        )
        .bind(&credit.id)
        .bind(credit.amount_paid)
        .bind(credit.balance_due)
        .bind(credit.status)
        .bind(credit.updated_at)
        .bind(previous_balance)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            warn!(credit_id = %credit_id, "Credit changed during payment");
            return Err(DbError::Conflict(format!(
                "credit {credit_id} was updated by another payment"
            )));
        }

        let payment = CreditPayment {
            id: Uuid::new_v4().to_string(),
            credit_id: credit.id.clone(),
            amount,
            payment_method: method,
            cashier_id: cashier_id.map(str::to_string),
            paid_at: now,
        };

        sqlx::query(
            "INSERT INTO credit_payments (id, credit_id, amount, payment_method, cashier_id, paid_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&payment.id)
        .bind(&payment.credit_id)
        .bind(payment.amount)
        .bind(payment.payment_method)
        .bind(&payment.cashier_id)
        .bind(payment.paid_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            credit_id = %credit.id,
            amount = %amount,
            balance = %credit.balance_due,
            status = %credit.status,
            "Credit payment recorded"
        );
        Ok((credit, payment))
    }

    /// Stores `overdue` on every unpaid credit whose due date is before
    /// `today`. Returns how many rows changed.
    pub async fn mark_overdue(&self, today: NaiveDate) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE credits SET status = 'overdue', updated_at = ?2
             WHERE status IN ('pending', 'partially_paid')
               AND due_date IS NOT NULL AND due_date < ?1",
        )
        .bind(today)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(count = result.rows_affected(), "Credits marked overdue");
        }
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use crate::Database;
    use duka_core::cart::{Cart, Tender};
    use duka_core::{CoreError, DateRange};

    async fn credit_sale(db: &Database, due_date: Option<NaiveDate>) -> Credit {
        let shop = test_support::shop(db, "CBD").await;
        let cashier = test_support::cashier(db, &shop, "k@duka.co.ke").await;
        let product = test_support::product(db, &shop, "Maize", 20).await;

        let mut cart = Cart::new(&shop.id);
        cart.add_product(&product, 10).unwrap();
        let tender = Tender::Credit {
            customer_name: "Otieno".to_string(),
            customer_phone: Some("0712345678".to_string()),
            deposit: Money::zero(),
            due_date,
        };
        let draft = cart.checkout(&cashier.id, &tender, Utc::now()).unwrap();
        db.transactions().record_sale(&draft).await.unwrap();
        draft.credit.unwrap()
    }

    #[tokio::test]
    async fn test_record_payment_until_paid() {
        let db = test_support::database().await;
        let credit = credit_sale(&db, None).await;
        assert_eq!(credit.balance_due, Money::from_units(1000));

        let (updated, payment) = db
            .credits()
            .record_payment(&credit.id, Money::from_units(400), PaymentMethod::Cash, None)
            .await
            .unwrap();
        assert_eq!(updated.status, CreditStatus::PartiallyPaid);
        assert_eq!(updated.balance_due, Money::from_units(600));
        assert_eq!(payment.amount, Money::from_units(400));

        let (updated, _) = db
            .credits()
            .record_payment(
                &credit.id,
                Money::from_units(600),
                PaymentMethod::BankMpesa,
                Some(&credit.cashier_id),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, CreditStatus::Paid);

        let stored = db.credits().get_by_id(&credit.id).await.unwrap().unwrap();
        assert_eq!(stored.amount_paid, Money::from_units(1000));
        assert_eq!(stored.balance_due, Money::zero());

        let payments = db.credits().payments(&credit.id).await.unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[1].payment_method, PaymentMethod::BankMpesa);
    }

    #[tokio::test]
    async fn test_overpayment_leaves_credit_untouched() {
        let db = test_support::database().await;
        let credit = credit_sale(&db, None).await;

        let err = db
            .credits()
            .record_payment(&credit.id, Money::from_units(1001), PaymentMethod::Cash, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::PaymentExceedsBalance { .. })
        ));

        let stored = db.credits().get_by_id(&credit.id).await.unwrap().unwrap();
        assert_eq!(stored.balance_due, Money::from_units(1000));
        assert!(db.credits().payments(&credit.id).await.unwrap().is_empty());

        assert!(matches!(
            db.credits()
                .record_payment("missing", Money::from_units(1), PaymentMethod::Cash, None)
                .await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_mark_overdue_and_status_filter() {
        let db = test_support::database().await;
        let due = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let credit = credit_sale(&db, Some(due)).await;

        assert_eq!(db.credits().mark_overdue(due).await.unwrap(), 0);
        assert_eq!(
            db.credits().mark_overdue(due.succ_opt().unwrap()).await.unwrap(),
            1
        );

        let overdue = db
            .credits()
            .list(&RecordFilter::new(), Some(CreditStatus::Overdue))
            .await
            .unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, credit.id);

        let today = Utc::now().date_naive();
        let filtered = db
            .credits()
            .list(
                &RecordFilter::new()
                    .with_range(Some(DateRange::single_day(today)))
                    .with_shop(&credit.shop_id),
                None,
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);

        let other_shop = db
            .credits()
            .list(&RecordFilter::new().with_shop("elsewhere"), None)
            .await
            .unwrap();
        assert!(other_shop.is_empty());
    }
}
