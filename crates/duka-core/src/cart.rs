//! # Cart & Checkout
//!
//! The cashier's cart and the rules that turn it into a recorded sale.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Cart → Sale                                    │
//! │                                                                         │
//! │  Cashier action           Cart operation            Rule checked        │
//! │  ──────────────           ──────────────            ────────────        │
//! │                                                                         │
//! │  Scan / pick product ───► add_product() ──────────► same shop, qty,     │
//! │                                                     stock, max lines    │
//! │  Change price ──────────► set_unit_price() ───────► >= min selling      │
//! │  Change quantity ───────► update_quantity() ──────► 1..=999, stock      │
//! │  Remove ────────────────► remove() ───────────────► must be in cart     │
//! │                                                                         │
//! │  Pay ───────────────────► checkout(tender) ───────► split sums to       │
//! │                                 │                   total, credit has   │
//! │                                 ▼                   customer + deposit  │
//! │                     SaleDraft { transaction, credit? }                  │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │                 duka-db records it in one DB transaction                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are snapshots: name and prices are frozen when the product is added,
//! so a catalog edit mid-sale does not change what the customer pays.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::numeric::deserialize_count;
use crate::types::{Credit, CreditStatus, PaymentMethod, Product, Transaction, TransactionItem};
use crate::validation::{validate_amount, validate_name, validate_phone, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub buying_price: Money,
    pub min_selling_price: Money,
    /// Agreed selling price; starts at the minimum selling price.
    pub unit_price: Money,
    pub quantity: i64,
    /// Stock on hand when the line was added.
    pub available_stock: i64,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            buying_price: product.buying_price,
            min_selling_price: product.min_selling_price,
            unit_price: product.min_selling_price,
            quantity,
            available_stock: product.current_stock,
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    pub fn line_cost(&self) -> Money {
        self.buying_price.multiply_quantity(self.quantity)
    }

    fn check_stock(&self, quantity: i64) -> CoreResult<()> {
        if quantity > self.available_stock {
            return Err(CoreError::InsufficientStock {
                product: self.name.clone(),
                available: self.available_stock,
                requested: quantity,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Tender
// =============================================================================

/// How the customer pays.
///
/// Wire shape is tagged by `paymentMethod`:
/// ```json
/// { "paymentMethod": "cash_bank_mpesa", "cashAmount": 300, "mpesaAmount": 200 }
/// { "paymentMethod": "credit", "customerName": "Otieno", "deposit": 100 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "paymentMethod", rename_all = "snake_case")]
pub enum Tender {
    Cash,
    BankMpesa,
    #[serde(rename = "cash_bank_mpesa", rename_all = "camelCase")]
    Split {
        #[serde(default)]
        cash_amount: Money,
        #[serde(default)]
        mpesa_amount: Money,
    },
    #[serde(rename_all = "camelCase")]
    Credit {
        customer_name: String,
        #[serde(default)]
        customer_phone: Option<String>,
        /// Paid up front; must be below the total.
        #[serde(default)]
        deposit: Money,
        #[serde(default)]
        due_date: Option<NaiveDate>,
    },
}

impl Tender {
    pub fn payment_method(&self) -> PaymentMethod {
        match self {
            Tender::Cash => PaymentMethod::Cash,
            Tender::BankMpesa => PaymentMethod::BankMpesa,
            Tender::Split { .. } => PaymentMethod::CashBankMpesa,
            Tender::Credit { .. } => PaymentMethod::Credit,
        }
    }
}

/// One requested line of a sale, as submitted by the till.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: String,
    #[serde(deserialize_with = "deserialize_count")]
    pub quantity: i64,
    /// Omitted means "sell at the minimum selling price".
    #[serde(default)]
    pub unit_price: Option<Money>,
}

/// Body of `POST /api/transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<SaleLineRequest>,
    #[serde(flatten)]
    pub tender: Tender,
}

/// A validated sale ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    pub transaction: Transaction,
    pub credit: Option<Credit>,
}

// =============================================================================
// Cart
// =============================================================================

/// The cashier's cart for one shop.
///
/// ## Invariants
/// - A product appears on one line only (adding again increases quantity)
/// - Quantity per line is 1..=999 and never above the stock seen when added
/// - At most 100 lines
/// - Unit price is never below the product's minimum selling price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub shop_id: String,
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(shop_id: impl Into<String>) -> Self {
        Cart {
            shop_id: shop_id.into(),
            lines: Vec::new(),
        }
    }

    /// Builds a cart from a till request against the shop's catalog.
    ///
    /// Lines naming the same product are merged.
    pub fn from_request(
        shop_id: impl Into<String>,
        catalog: &[Product],
        lines: &[SaleLineRequest],
    ) -> CoreResult<Self> {
        let mut cart = Cart::new(shop_id);

        for line in lines {
            let product = catalog
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            cart.add_product(product, line.quantity)?;
            if let Some(price) = line.unit_price {
                cart.set_unit_price(&product.id, price)?;
            }
        }

        Ok(cart)
    }

    /// Adds a product, or increases its quantity if already present.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if product.shop_id != self.shop_id {
            return Err(CoreError::WrongShop {
                product_id: product.id.clone(),
                shop_id: self.shop_id.clone(),
            });
        }
        validate_quantity(quantity)?;

        if let Some(line) = self.line_mut(&product.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.check_stock(new_qty)?;
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        let line = CartLine::from_product(product, quantity);
        line.check_stock(quantity)?;
        self.lines.push(line);
        Ok(())
    }

    /// Sets a line's quantity. Zero removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove(product_id);
        }
        validate_quantity(quantity)?;

        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        line.check_stock(quantity)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Negotiated price for a line; may not go under the minimum.
    pub fn set_unit_price(&mut self, product_id: &str, price: Money) -> CoreResult<()> {
        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        validate_amount("unitPrice", price)?;
        if price < line.min_selling_price {
            return Err(CoreError::PriceBelowMinimum {
                product: line.name.clone(),
                price,
                minimum: line.min_selling_price,
            });
        }
        line.unit_price = price;
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CoreError::NotInCart(product_id.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn cost(&self) -> Money {
        self.lines.iter().map(CartLine::line_cost).sum()
    }

    pub fn profit(&self) -> Money {
        self.total() - self.cost()
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Validates the tender and produces the records to persist.
    ///
    /// ## Tender Rules
    /// | method           | rule                                            |
    /// |------------------|-------------------------------------------------|
    /// | cash             | none                                            |
    /// | bank_mpesa       | none                                            |
    /// | cash_bank_mpesa  | cash + mpesa == total                           |
    /// | credit           | customer name required, 0 <= deposit < total    |
    ///
    /// ```rust
    /// use chrono::Utc;
    /// use duka_core::cart::{Cart, Tender};
    /// use duka_core::{Money, Product};
    ///
    /// let now = Utc::now();
    /// let soap = Product {
    ///     id: "p-1".into(), shop_id: "s-1".into(), name: "Soap".into(),
    ///     category: None, buying_price: Money::from_units(40),
    ///     min_selling_price: Money::from_units(50), current_stock: 10,
    ///     min_stock_level: 2, created_at: now, updated_at: now,
    /// };
    ///
    /// let mut cart = Cart::new("s-1");
    /// cart.add_product(&soap, 2).unwrap();
    /// let sale = cart.checkout("k-1", &Tender::Cash, now).unwrap();
    ///
    /// assert_eq!(sale.transaction.total_amount, Money::from_units(100));
    /// assert_eq!(sale.transaction.profit, Money::from_units(20));
    /// assert!(sale.credit.is_none());
    /// ```
    pub fn checkout(
        &self,
        cashier_id: &str,
        tender: &Tender,
        at: DateTime<Utc>,
    ) -> CoreResult<SaleDraft> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let total = self.total();
        let cost = self.cost();
        let transaction_id = Uuid::new_v4().to_string();

        let (cash_amount, mpesa_amount) = match tender {
            Tender::Cash => (total, Money::zero()),
            Tender::BankMpesa => (Money::zero(), total),
            Tender::Split {
                cash_amount,
                mpesa_amount,
            } => {
                validate_amount("cashAmount", *cash_amount)?;
                validate_amount("mpesaAmount", *mpesa_amount)?;
                if *cash_amount + *mpesa_amount != total {
                    return Err(CoreError::SplitMismatch {
                        cash: *cash_amount,
                        mpesa: *mpesa_amount,
                        total,
                    });
                }
                (*cash_amount, *mpesa_amount)
            }
            Tender::Credit { .. } => (Money::zero(), Money::zero()),
        };

        let credit = match tender {
            Tender::Credit {
                customer_name,
                customer_phone,
                deposit,
                due_date,
            } => Some(self.open_credit(
                &transaction_id,
                cashier_id,
                customer_name,
                customer_phone.as_deref(),
                *deposit,
                *due_date,
                at,
            )?),
            _ => None,
        };

        let items = self
            .lines
            .iter()
            .map(|line| TransactionItem {
                id: Uuid::new_v4().to_string(),
                transaction_id: transaction_id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                buying_price: line.buying_price,
                total: line.line_total(),
            })
            .collect();

        let transaction = Transaction {
            id: transaction_id,
            shop_id: self.shop_id.clone(),
            cashier_id: cashier_id.to_string(),
            items,
            total_amount: total,
            payment_method: tender.payment_method(),
            cash_amount,
            mpesa_amount,
            cost,
            profit: total - cost,
            customer_name: credit.as_ref().map(|c| c.customer_name.clone()),
            sale_date: at,
        };

        Ok(SaleDraft {
            transaction,
            credit,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn open_credit(
        &self,
        transaction_id: &str,
        cashier_id: &str,
        customer_name: &str,
        customer_phone: Option<&str>,
        deposit: Money,
        due_date: Option<NaiveDate>,
        at: DateTime<Utc>,
    ) -> CoreResult<Credit> {
        validate_name("customer_name", customer_name)?;
        if let Some(phone) = customer_phone {
            validate_phone(phone)?;
        }

        validate_amount("deposit", deposit)?;
        let total = self.total();
        if deposit >= total {
            return Err(CoreError::InvalidPaymentAmount {
                reason: format!("deposit must be at least 0 and below the total {}", total),
            });
        }

        Ok(Credit {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction_id.to_string(),
            shop_id: self.shop_id.clone(),
            cashier_id: cashier_id.to_string(),
            customer_name: customer_name.trim().to_string(),
            customer_phone: customer_phone.map(|p| p.trim().to_string()),
            total_amount: total,
            amount_paid: deposit,
            balance_due: total - deposit,
            status: if deposit.is_zero() {
                CreditStatus::Pending
            } else {
                CreditStatus::PartiallyPaid
            },
            due_date,
            created_at: at,
            updated_at: at,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, buying: i64, min_selling: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            shop_id: "s-1".to_string(),
            name: format!("Product {}", id),
            category: None,
            buying_price: Money::from_units(buying),
            min_selling_price: Money::from_units(min_selling),
            current_stock: stock,
            min_stock_level: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn cart_with(lines: &[(&Product, i64)]) -> Cart {
        let mut cart = Cart::new("s-1");
        for (p, qty) in lines {
            cart.add_product(p, *qty).unwrap();
        }
        cart
    }

    #[test]
    fn test_add_same_product_merges_lines() {
        let sugar = product("p-1", 100, 120, 50);
        let mut cart = cart_with(&[(&sugar, 2)]);
        cart.add_product(&sugar, 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
        assert_eq!(cart.total(), Money::from_units(600));
        assert_eq!(cart.cost(), Money::from_units(500));
        assert_eq!(cart.profit(), Money::from_units(100));
    }

    #[test]
    fn test_add_rejects_quantity_above_stock() {
        let milk = product("p-1", 50, 60, 3);
        let mut cart = Cart::new("s-1");

        let err = cart.add_product(&milk, 4).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 3,
                requested: 4,
                ..
            }
        ));

        cart.add_product(&milk, 3).unwrap();
        assert!(cart.add_product(&milk, 1).is_err());
        assert!(cart.update_quantity("p-1", 4).is_err());
    }

    #[test]
    fn test_add_rejects_bad_quantity_and_other_shop() {
        let mut other = product("p-2", 10, 20, 5000);
        let mut cart = Cart::new("s-1");

        assert!(matches!(
            cart.add_product(&other, 0),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.add_product(&other, 1000).is_err());

        cart.add_product(&other, 999).unwrap();
        assert!(matches!(
            cart.add_product(&other, 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));

        other.shop_id = "s-2".to_string();
        assert!(matches!(
            Cart::new("s-1").add_product(&other, 1),
            Err(CoreError::WrongShop { .. })
        ));
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = Cart::new("s-1");
        for i in 0..MAX_CART_ITEMS {
            cart.add_product(&product(&format!("p-{}", i), 1, 2, 10), 1)
                .unwrap();
        }
        assert!(matches!(
            cart.add_product(&product("one-too-many", 1, 2, 10), 1),
            Err(CoreError::CartTooLarge { max: 100 })
        ));
    }

    #[test]
    fn test_price_below_minimum_rejected() {
        let rice = product("p-1", 80, 100, 10);
        let mut cart = cart_with(&[(&rice, 1)]);

        assert!(matches!(
            cart.set_unit_price("p-1", Money::from_units(99)),
            Err(CoreError::PriceBelowMinimum { .. })
        ));
        cart.set_unit_price("p-1", Money::from_units(110)).unwrap();
        assert_eq!(cart.total(), Money::from_units(110));
    }

    #[test]
    fn test_update_and_remove() {
        let a = product("p-1", 10, 20, 10);
        let b = product("p-2", 10, 20, 10);
        let mut cart = cart_with(&[(&a, 1), (&b, 1)]);

        cart.update_quantity("p-1", 4).unwrap();
        assert_eq!(cart.total_quantity(), 5);

        cart.update_quantity("p-2", 0).unwrap();
        assert_eq!(cart.line_count(), 1);

        assert!(matches!(cart.remove("p-2"), Err(CoreError::NotInCart(_))));
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_from_request() {
        let catalog = vec![product("p-1", 10, 20, 10), product("p-2", 30, 40, 10)];
        let lines = vec![
            SaleLineRequest {
                product_id: "p-1".to_string(),
                quantity: 2,
                unit_price: Some(Money::from_units(25)),
            },
            SaleLineRequest {
                product_id: "p-2".to_string(),
                quantity: 1,
                unit_price: None,
            },
        ];

        let cart = Cart::from_request("s-1", &catalog, &lines).unwrap();
        assert_eq!(cart.total(), Money::from_units(90));

        let missing = vec![SaleLineRequest {
            product_id: "nope".to_string(),
            quantity: 1,
            unit_price: None,
        }];
        assert!(matches!(
            Cart::from_request("s-1", &catalog, &missing),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_checkout_empty_cart() {
        assert!(matches!(
            Cart::new("s-1").checkout("k-1", &Tender::Cash, Utc::now()),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_checkout_cash_snapshots_items() {
        let p = product("p-1", 60, 100, 10);
        let cart = cart_with(&[(&p, 3)]);
        let sale = cart.checkout("k-1", &Tender::Cash, Utc::now()).unwrap();

        let t = &sale.transaction;
        assert_eq!(t.payment_method, PaymentMethod::Cash);
        assert_eq!(t.total_amount, Money::from_units(300));
        assert_eq!(t.cost, Money::from_units(180));
        assert_eq!(t.profit, Money::from_units(120));
        assert_eq!(t.cash_amount, t.total_amount);
        assert_eq!(t.items.len(), 1);
        assert_eq!(t.items[0].transaction_id, t.id);
        assert_eq!(t.items[0].total, Money::from_units(300));
    }

    #[test]
    fn test_checkout_split_must_sum_to_total() {
        let p = product("p-1", 60, 100, 10);
        let cart = cart_with(&[(&p, 5)]);

        let short = Tender::Split {
            cash_amount: Money::from_units(300),
            mpesa_amount: Money::from_units(100),
        };
        assert!(matches!(
            cart.checkout("k-1", &short, Utc::now()),
            Err(CoreError::SplitMismatch { .. })
        ));

        let exact = Tender::Split {
            cash_amount: Money::from_units(300),
            mpesa_amount: Money::from_units(200),
        };
        let sale = cart.checkout("k-1", &exact, Utc::now()).unwrap();
        assert_eq!(sale.transaction.payment_method, PaymentMethod::CashBankMpesa);
        assert_eq!(sale.transaction.mpesa_amount, Money::from_units(200));
    }

    #[test]
    fn test_oversized_amounts_rejected_without_panic() {
        let p = product("p-1", 60, 100, 10);
        let mut cart = cart_with(&[(&p, 5)]);

        let tender: Tender = serde_json::from_str(
            r#"{"paymentMethod": "cash_bank_mpesa", "cashAmount": 1e17, "mpesaAmount": 1e17}"#,
        )
        .unwrap();
        assert!(matches!(
            cart.checkout("k-1", &tender, Utc::now()),
            Err(CoreError::Validation(_))
        ));

        let deposit = Tender::Credit {
            customer_name: "Otieno".to_string(),
            customer_phone: None,
            deposit: Money::from_major(1e17),
            due_date: None,
        };
        assert!(matches!(
            cart.checkout("k-1", &deposit, Utc::now()),
            Err(CoreError::Validation(_))
        ));

        assert!(matches!(
            cart.set_unit_price("p-1", Money::from_major(1e17)),
            Err(CoreError::Validation(_))
        ));

        // A product stored before the cap existed still checks out, clamped.
        let mut legacy = product("p-2", 1, 2, 1000);
        legacy.buying_price = Money::from_major(1e17);
        legacy.min_selling_price = Money::from_major(1e17);
        cart.add_product(&legacy, 999).unwrap();
        let sale = cart.checkout("k-1", &Tender::Cash, Utc::now()).unwrap();
        assert_eq!(sale.transaction.total_amount.cents(), i64::MAX);
    }

    #[test]
    fn test_checkout_credit_opens_credit() {
        let p = product("p-1", 60, 100, 10);
        let cart = cart_with(&[(&p, 2)]);

        let tender = Tender::Credit {
            customer_name: "  Otieno ".to_string(),
            customer_phone: Some("0712345678".to_string()),
            deposit: Money::from_units(50),
            due_date: None,
        };
        let sale = cart.checkout("k-1", &tender, Utc::now()).unwrap();
        let credit = sale.credit.unwrap();

        assert_eq!(credit.transaction_id, sale.transaction.id);
        assert_eq!(credit.customer_name, "Otieno");
        assert_eq!(credit.amount_paid, Money::from_units(50));
        assert_eq!(credit.balance_due, Money::from_units(150));
        assert_eq!(credit.status, CreditStatus::PartiallyPaid);
        assert_eq!(sale.transaction.customer_name.as_deref(), Some("Otieno"));

        let no_deposit = Tender::Credit {
            customer_name: "Otieno".to_string(),
            customer_phone: None,
            deposit: Money::zero(),
            due_date: None,
        };
        let credit = cart
            .checkout("k-1", &no_deposit, Utc::now())
            .unwrap()
            .credit
            .unwrap();
        assert_eq!(credit.status, CreditStatus::Pending);
    }

    #[test]
    fn test_checkout_credit_rules() {
        let p = product("p-1", 60, 100, 10);
        let cart = cart_with(&[(&p, 2)]);

        let nameless = Tender::Credit {
            customer_name: " ".to_string(),
            customer_phone: None,
            deposit: Money::zero(),
            due_date: None,
        };
        assert!(matches!(
            cart.checkout("k-1", &nameless, Utc::now()),
            Err(CoreError::Validation(_))
        ));

        let full_deposit = Tender::Credit {
            customer_name: "Otieno".to_string(),
            customer_phone: None,
            deposit: Money::from_units(200),
            due_date: None,
        };
        assert!(matches!(
            cart.checkout("k-1", &full_deposit, Utc::now()),
            Err(CoreError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn test_checkout_request_wire_shape() {
        let json = r#"{
            "items": [{"productId": "p-1", "quantity": 2}],
            "paymentMethod": "cash_bank_mpesa",
            "cashAmount": 150,
            "mpesaAmount": "50"
        }"#;
        let req: CheckoutRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.items[0].quantity, 2);
        assert_eq!(
            req.tender,
            Tender::Split {
                cash_amount: Money::from_units(150),
                mpesa_amount: Money::from_units(50),
            }
        );

        let json = r#"{"items": [], "paymentMethod": "credit", "customerName": "Achieng"}"#;
        let req: CheckoutRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.tender.payment_method(), PaymentMethod::Credit);
    }
}
