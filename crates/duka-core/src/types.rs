//! # Domain Types
//!
//! Core records used throughout Duka POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────┐     ┌───────────┐      ┌─────────────────┐               │
//! │  │   Shop    │◄────│  Cashier  │      │    Product      │──► Shop       │
//! │  └───────────┘     └───────────┘      │  buying_price   │               │
//! │        ▲                 ▲            │  min_selling    │               │
//! │        │                 │            │  current_stock  │               │
//! │  ┌─────┴─────────────────┴─────┐      └─────────────────┘               │
//! │  │        Transaction          │                                        │
//! │  │  total_amount, cost, profit │──► TransactionItem[] (snapshots)       │
//! │  │  payment_method             │                                        │
//! │  └─────────────┬───────────────┘                                        │
//! │                │ payment_method = credit                                │
//! │                ▼                                                        │
//! │  ┌─────────────────────────────┐      ┌─────────────────┐               │
//! │  │          Credit             │──►   │  CreditPayment  │               │
//! │  │  total, paid, balance_due   │      └─────────────────┘               │
//! │  │  status                     │                                        │
//! │  └─────────────────────────────┘      ┌─────────────────┐               │
//! │                                       │    Expense      │               │
//! │                                       └─────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All IDs are UUID v4 strings. All amounts are [`Money`]; numeric fields that
//! arrive malformed over JSON deserialize as zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::numeric::deserialize_count;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Bank transfer or M-Pesa mobile money.
    BankMpesa,
    /// Split tender: part cash, part bank/M-Pesa.
    CashBankMpesa,
    /// Deferred payment tracked by a [`Credit`].
    Credit,
}

impl PaymentMethod {
    /// Every method, in display order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::BankMpesa,
        PaymentMethod::CashBankMpesa,
        PaymentMethod::Credit,
    ];

    /// Wire name of the method.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankMpesa => "bank_mpesa",
            PaymentMethod::CashBankMpesa => "cash_bank_mpesa",
            PaymentMethod::Credit => "credit",
        }
    }

    /// Whether money changed hands at the till.
    pub const fn is_immediate(&self) -> bool {
        !matches!(self, PaymentMethod::Credit)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.to_string()).collect(),
            })
    }
}

// =============================================================================
// Credit Status
// =============================================================================

/// Lifecycle of a credit sale.
///
/// ```text
///  pending ──(part payment)──► partially_paid ──(balance 0)──► paid
///     │                               │
///     └──────(due date passes)────────┴──────► overdue ──(balance 0)──► paid
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Overdue,
}

impl CreditStatus {
    pub const ALL: [CreditStatus; 4] = [
        CreditStatus::Pending,
        CreditStatus::PartiallyPaid,
        CreditStatus::Paid,
        CreditStatus::Overdue,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            CreditStatus::Pending => "pending",
            CreditStatus::PartiallyPaid => "partially_paid",
            CreditStatus::Paid => "paid",
            CreditStatus::Overdue => "overdue",
        }
    }
}

impl Default for CreditStatus {
    fn default() -> Self {
        CreditStatus::Pending
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CreditStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: CreditStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Shop
// =============================================================================

/// A physical shop (branch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Cashier
// =============================================================================

/// A cashier account attached to one shop.
///
/// The password hash is stored by duka-db and never leaves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Cashier {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A back-office administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in a shop's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub category: Option<String>,

    /// What the shop paid per unit (COGS basis).
    #[serde(default)]
    pub buying_price: Money,

    /// Lowest price a cashier may sell at.
    #[serde(default)]
    pub min_selling_price: Money,

    #[serde(default, deserialize_with = "deserialize_count")]
    pub current_stock: i64,

    /// Reorder threshold.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub min_stock_level: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// At or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock_level
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.current_stock <= 0
    }

    /// Stock valued at buying price. Negative stock counts as zero.
    pub fn stock_value(&self) -> Money {
        self.buying_price.multiply_quantity(self.current_stock.max(0))
    }

    /// Checks if `quantity` units can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A line of a completed sale.
///
/// Snapshot pattern: name and prices are frozen at the time of sale, so later
/// catalog edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub product_name: String,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub quantity: i64,
    /// Selling price per unit.
    #[serde(default)]
    pub unit_price: Money,
    /// Buying price per unit at time of sale.
    #[serde(default)]
    pub buying_price: Money,
    /// unit_price × quantity.
    #[serde(default)]
    pub total: Money,
}

impl TransactionItem {
    /// Cost of goods for this line.
    #[inline]
    pub fn cost(&self) -> Money {
        self.buying_price.multiply_quantity(self.quantity.max(0))
    }
}

/// A completed sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub shop_id: String,
    pub cashier_id: String,

    /// Loaded separately from `transaction_items`.
    #[serde(default)]
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<TransactionItem>,

    #[serde(default)]
    pub total_amount: Money,
    pub payment_method: PaymentMethod,

    /// Cash part of a split tender (0 otherwise).
    #[serde(default)]
    pub cash_amount: Money,
    /// Bank / M-Pesa part of a split tender (0 otherwise).
    #[serde(default)]
    pub mpesa_amount: Money,

    /// Cost of goods recorded at sale time.
    #[serde(default)]
    pub cost: Money,
    /// Profit recorded at sale time.
    #[serde(default)]
    pub profit: Money,

    /// Customer for credit sales.
    pub customer_name: Option<String>,
    pub sale_date: DateTime<Utc>,
}

impl Transaction {
    /// Calendar day of the sale (UTC).
    pub fn sale_day(&self) -> NaiveDate {
        self.sale_date.date_naive()
    }

    pub fn is_credit(&self) -> bool {
        self.payment_method == PaymentMethod::Credit
    }
}

// =============================================================================
// Credit
// =============================================================================

/// The receivable created by a credit sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub id: String,
    pub transaction_id: String,
    pub shop_id: String,
    pub cashier_id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub amount_paid: Money,
    #[serde(default)]
    pub balance_due: Money,
    #[serde(default)]
    pub status: CreditStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credit {
    pub fn is_paid(&self) -> bool {
        self.status == CreditStatus::Paid
    }

    /// Status as of `today`: an unpaid credit past its due date is overdue
    /// whatever its stored status says.
    pub fn effective_status(&self, today: NaiveDate) -> CreditStatus {
        if self.is_paid() {
            return CreditStatus::Paid;
        }
        match self.due_date {
            Some(due) if due < today => CreditStatus::Overdue,
            _ => self.status,
        }
    }

    /// Applies a repayment.
    ///
    /// ## Rules
    /// - amount must be positive
    /// - amount must not exceed the balance due
    /// - zero balance marks the credit paid, otherwise partially paid
    pub fn apply_payment(&mut self, amount: Money, at: DateTime<Utc>) -> CoreResult<()> {
        if self.is_paid() || !self.balance_due.is_positive() {
            return Err(CoreError::CreditSettled(self.id.clone()));
        }
        if !amount.is_positive() {
            return Err(CoreError::InvalidPaymentAmount {
                reason: "amount must be positive".to_string(),
            });
        }
        if amount > self.balance_due {
            return Err(CoreError::PaymentExceedsBalance {
                balance: self.balance_due,
                requested: amount,
            });
        }

        self.amount_paid += amount;
        self.balance_due -= amount;
        self.status = if self.balance_due.is_zero() {
            CreditStatus::Paid
        } else {
            CreditStatus::PartiallyPaid
        };
        self.updated_at = at;
        Ok(())
    }
}

/// A repayment against a credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CreditPayment {
    pub id: String,
    pub credit_id: String,
    #[serde(default)]
    pub amount: Money,
    pub payment_method: PaymentMethod,
    pub cashier_id: Option<String>,
    pub paid_at: DateTime<Utc>,
}

// =============================================================================
// Expense
// =============================================================================

/// An operating expense (rent, wages, transport...).
///
/// `shop_id` is `None` for business-wide expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub shop_id: Option<String>,
    pub category: String,
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Money,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
