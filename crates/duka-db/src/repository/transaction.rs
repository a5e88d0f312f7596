//! # Transaction Repository
//!
//! Sales and their item snapshots.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 record_sale(draft)  (one SQLite transaction)            │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    INSERT transactions                                                 │
//! │    for each item:                                                      │
//! │      UPDATE products SET current_stock = current_stock - qty           │
//! │        WHERE id = ? AND shop_id = ? AND current_stock >= qty           │
//! │        └── 0 rows? ──► ROLLBACK, InsufficientStock / NotFound          │
//! │      INSERT transaction_items                                          │
//! │    INSERT credits            (credit sales only)                       │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Either everything above is stored or nothing is.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use duka_core::cart::SaleDraft;
use duka_core::{CoreError, RecordFilter, Transaction, TransactionItem};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::credit::insert_credit;
use super::{push_filter, FilterColumns};
use crate::error::{DbError, DbResult};

const TRANSACTION_COLUMNS: &str = "t.id AS id, t.shop_id AS shop_id, t.cashier_id AS cashier_id, \
     t.total_amount AS total_amount, t.payment_method AS payment_method, \
     t.cash_amount AS cash_amount, t.mpesa_amount AS mpesa_amount, t.cost AS cost, \
     t.profit AS profit, t.customer_name AS customer_name, t.sale_date AS sale_date";

const ITEM_COLUMNS: &str = "ti.id AS id, ti.transaction_id AS transaction_id, \
     ti.product_id AS product_id, ti.product_name AS product_name, ti.quantity AS quantity, \
     ti.unit_price AS unit_price, ti.buying_price AS buying_price, ti.total AS total";

const FILTER: FilterColumns = FilterColumns {
    day: "substr(t.sale_date, 1, 10)",
    shop: "t.shop_id",
    cashier: Some("t.cashier_id"),
};

#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Every sale matching the filter, newest first, with items attached.
    pub async fn list(&self, filter: &RecordFilter) -> DbResult<Vec<Transaction>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE 1 = 1"
        ));
        push_filter(&mut qb, filter, &FILTER);
        qb.push(" ORDER BY t.sale_date DESC, t.id");

        let mut transactions = qb
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {ITEM_COLUMNS} FROM transaction_items ti \
             JOIN transactions t ON t.id = ti.transaction_id WHERE 1 = 1"
        ));
        push_filter(&mut qb, filter, &FILTER);

        let items = qb
            .build_query_as::<TransactionItem>()
            .fetch_all(&self.pool)
            .await?;

        attach_items(&mut transactions, items);

        debug!(count = transactions.len(), "Listed transactions");
        Ok(transactions)
    }

    /// One page of matching sales, newest first, with items attached.
    pub async fn page(
        &self,
        filter: &RecordFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Transaction>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE 1 = 1"
        ));
        push_filter(&mut qb, filter, &FILTER);
        qb.push(" ORDER BY t.sale_date DESC, t.id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let mut transactions = qb
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;

        if transactions.is_empty() {
            return Ok(transactions);
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {ITEM_COLUMNS} FROM transaction_items ti WHERE ti.transaction_id IN ("
        ));
        let mut ids = qb.separated(", ");
        for t in &transactions {
            ids.push_bind(t.id.clone());
        }
        ids.push_unseparated(")");

        let items = qb
            .build_query_as::<TransactionItem>()
            .fetch_all(&self.pool)
            .await?;

        attach_items(&mut transactions, items);
        Ok(transactions)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE t.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut transaction) = transaction else {
            return Ok(None);
        };

        transaction.items = sqlx::query_as::<_, TransactionItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM transaction_items ti WHERE ti.transaction_id = ?1"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(transaction))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Stores a checked-out sale: transaction, items, stock decrement and
    /// credit, atomically.
    pub async fn record_sale(&self, draft: &SaleDraft) -> DbResult<()> {
        let t = &draft.transaction;
        debug!(id = %t.id, shop_id = %t.shop_id, items = t.items.len(), "Recording sale");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO transactions (
                id, shop_id, cashier_id, total_amount, payment_method,
                cash_amount, mpesa_amount, cost, profit, customer_name, sale_date
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&t.id)
        .bind(&t.shop_id)
        .bind(&t.cashier_id)
        .bind(t.total_amount)
        .bind(t.payment_method)
        .bind(t.cash_amount)
        .bind(t.mpesa_amount)
        .bind(t.cost)
        .bind(t.profit)
        .bind(&t.customer_name)
        .bind(t.sale_date)
        .execute(&mut *tx)
        .await?;

        for item in &t.items {
            let updated = sqlx::query(
                "UPDATE products SET current_stock = current_stock - ?1, updated_at = ?2
                 WHERE id = ?3 AND shop_id = ?4 AND current_stock >= ?1",
            )
            .bind(item.quantity)
            .bind(now)
            .bind(&item.product_id)
            .bind(&t.shop_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                let available: Option<i64> = sqlx::query_scalar(
                    "SELECT current_stock FROM products WHERE id = ?1 AND shop_id = ?2",
                )
                .bind(&item.product_id)
                .bind(&t.shop_id)
                .fetch_optional(&mut *tx)
                .await?;

                // tx drops here: rollback
                return Err(match available {
                    None => DbError::not_found("Product", &item.product_id),
                    Some(available) => CoreError::InsufficientStock {
                        product: item.product_name.clone(),
                        available,
                        requested: item.quantity,
                    }
                    .into(),
                });
            }

            sqlx::query(
                "INSERT INTO transaction_items (
                    id, transaction_id, product_id, product_name, quantity,
                    unit_price, buying_price, total
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(&item.id)
            .bind(&t.id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.buying_price)
            .bind(item.total)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(credit) = &draft.credit {
            insert_credit(&mut tx, credit).await?;
        }

        tx.commit().await?;

        info!(
            id = %t.id,
            total = %t.total_amount,
            method = %t.payment_method,
            "Sale recorded"
        );
        Ok(())
    }
}

fn attach_items(transactions: &mut [Transaction], items: Vec<TransactionItem>) {
    let mut by_transaction: HashMap<String, Vec<TransactionItem>> = HashMap::new();
    for item in items {
        by_transaction
            .entry(item.transaction_id.clone())
            .or_default()
            .push(item);
    }

    for t in transactions {
        if let Some(items) = by_transaction.remove(&t.id) {
            t.items = items;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use chrono::{Duration, NaiveDate};
    use duka_core::cart::{Cart, Tender};
    use duka_core::{CreditStatus, DateRange, Money, PaymentMethod};

    #[tokio::test]
    async fn test_record_sale_decrements_stock() {
        let db = test_support::database().await;
        let shop = test_support::shop(&db, "CBD").await;
        let cashier = test_support::cashier(&db, &shop, "k@duka.co.ke").await;
        let product = test_support::product(&db, &shop, "Sugar", 10).await;

        let mut cart = Cart::new(&shop.id);
        cart.add_product(&product, 3).unwrap();
        let draft = cart.checkout(&cashier.id, &Tender::Cash, Utc::now()).unwrap();

        db.transactions().record_sale(&draft).await.unwrap();

        let stock = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stock.current_stock, 7);

        let saved = db
            .transactions()
            .get_by_id(&draft.transaction.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.total_amount, Money::from_units(300));
        assert_eq!(saved.payment_method, PaymentMethod::Cash);
        assert_eq!(saved.items.len(), 1);
        assert_eq!(saved.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_record_sale_rolls_back_on_insufficient_stock() {
        let db = test_support::database().await;
        let shop = test_support::shop(&db, "CBD").await;
        let cashier = test_support::cashier(&db, &shop, "k@duka.co.ke").await;
        let plenty = test_support::product(&db, &shop, "Salt", 50).await;
        let scarce = test_support::product(&db, &shop, "Oil", 5).await;

        let mut cart = Cart::new(&shop.id);
        cart.add_product(&plenty, 2).unwrap();
        cart.add_product(&scarce, 5).unwrap();
        let draft = cart.checkout(&cashier.id, &Tender::Cash, Utc::now()).unwrap();

        // Someone else sold the oil in the meantime.
        db.products().adjust_stock(&scarce.id, -3).await.unwrap();

        let err = db.transactions().record_sale(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock {
                available: 2,
                requested: 5,
                ..
            })
        ));

        let salt = db.products().get_by_id(&plenty.id).await.unwrap().unwrap();
        assert_eq!(salt.current_stock, 50);
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_credit_sale_creates_credit() {
        let db = test_support::database().await;
        let shop = test_support::shop(&db, "CBD").await;
        let cashier = test_support::cashier(&db, &shop, "k@duka.co.ke").await;
        let product = test_support::product(&db, &shop, "Flour", 10).await;

        let mut cart = Cart::new(&shop.id);
        cart.add_product(&product, 2).unwrap();
        let tender = Tender::Credit {
            customer_name: "Baraka".to_string(),
            customer_phone: None,
            deposit: Money::from_units(50),
            due_date: None,
        };
        let draft = cart.checkout(&cashier.id, &tender, Utc::now()).unwrap();
        db.transactions().record_sale(&draft).await.unwrap();

        let credits = db
            .credits()
            .list(&RecordFilter::new(), None)
            .await
            .unwrap();
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0].transaction_id, draft.transaction.id);
        assert_eq!(credits[0].balance_due, Money::from_units(150));
        assert_eq!(credits[0].status, CreditStatus::PartiallyPaid);
    }

    #[tokio::test]
    async fn test_list_filters_by_inclusive_range_and_cashier() {
        let db = test_support::database().await;
        let shop = test_support::shop(&db, "CBD").await;
        let k1 = test_support::cashier(&db, &shop, "k1@duka.co.ke").await;
        let k2 = test_support::cashier(&db, &shop, "k2@duka.co.ke").await;
        let product = test_support::product(&db, &shop, "Tea", 100).await;

        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let late_evening = day.and_hms_opt(23, 59, 59).unwrap().and_utc();

        for (cashier, at) in [
            (&k1, late_evening),
            (&k1, late_evening + Duration::seconds(1)),
            (&k2, late_evening - Duration::days(1)),
        ] {
            let mut cart = Cart::new(&shop.id);
            cart.add_product(&product, 1).unwrap();
            let draft = cart.checkout(&cashier.id, &Tender::Cash, at).unwrap();
            db.transactions().record_sale(&draft).await.unwrap();
        }

        let range = DateRange::new(day - Duration::days(1), day).unwrap();
        let in_range = db
            .transactions()
            .list(&RecordFilter::new().with_range(Some(range)))
            .await
            .unwrap();
        assert_eq!(in_range.len(), 2);
        assert!(in_range.iter().all(|t| t.items.len() == 1));

        let by_k1 = db
            .transactions()
            .list(&RecordFilter::new().with_cashier(&k1.id))
            .await
            .unwrap();
        assert_eq!(by_k1.len(), 2);

        let page = db
            .transactions()
            .page(&RecordFilter::new(), 2, 0)
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].sale_date, late_evening + Duration::seconds(1));
        assert_eq!(page[0].items.len(), 1);
    }
}
