//! # Seed Data Generator
//!
//! Populates the database with demo shops, cashiers, products, sales, credits
//! and expenses for development.
//!
//! ## Usage
//! ```bash
//! # Two weeks of history (default)
//! cargo run -p duka-api --bin seed
//!
//! # Longer history
//! cargo run -p duka-api --bin seed -- --days 60
//!
//! # Specify database path
//! cargo run -p duka-api --bin seed -- --db ./data/duka.db
//! ```
//!
//! Every demo cashier logs in with the password `Duka@2024`.

use std::env;

use chrono::{Duration, NaiveDate, Utc};
use duka_api::auth::hash_password;
use duka_core::cart::{Cart, SaleLineRequest, Tender};
use duka_core::{Cashier, Expense, Money, PaymentMethod, Product, Shop};
use duka_db::{Database, DbConfig};
use uuid::Uuid;

const DEMO_PASSWORD: &str = "Duka@2024";

/// (name, location)
const SHOPS: &[(&str, &str)] = &[
    ("Kariakor Branch", "Nairobi"),
    ("Kongowea Branch", "Mombasa"),
    ("Oile Branch", "Kisumu"),
];

/// (name, email prefix) per shop, in shop order.
const CASHIERS: &[&[(&str, &str)]] = &[
    &[("Wanjiku Kamau", "wanjiku"), ("Brian Otieno", "brian")],
    &[("Fatuma Ali", "fatuma"), ("Hassan Mwinyi", "hassan")],
    &[("Achieng Odhiambo", "achieng")],
];

/// (name, category, buying price, min selling price) in shillings.
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("Unga Jogoo 2kg", "Flour", 150, 180),
    ("Pembe Maize Flour 2kg", "Flour", 145, 175),
    ("Mumias Sugar 1kg", "Sugar", 140, 165),
    ("Kabras Sugar 2kg", "Sugar", 270, 320),
    ("Brookside Milk 500ml", "Dairy", 50, 60),
    ("KCC Mala 500ml", "Dairy", 55, 70),
    ("Kimbo 1kg", "Cooking Fat", 320, 370),
    ("Elianto Oil 1L", "Cooking Oil", 290, 340),
    ("Ketepa Tea 100g", "Beverages", 95, 120),
    ("Omo 1kg", "Detergents", 260, 310),
    ("Sunlight Bar", "Detergents", 95, 115),
    ("Royco Mchuzi Mix", "Spices", 12, 15),
    ("Exe Bread 400g", "Bakery", 55, 65),
    ("Soko Ugali Flour 1kg", "Flour", 75, 95),
    ("Daawat Rice 1kg", "Rice", 210, 250),
];

/// (category, description, amount) per shop per week.
const WEEKLY_EXPENSES: &[(&str, &str, i64)] = &[
    ("Transport", "Restock trip", 1_500),
    ("Utilities", "Electricity tokens", 800),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Mama Mboga Njeri", "0712345678"),
    ("Juma Hardware", "0722111222"),
    ("Kevin Boda Boda", "0733444555"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./duka_dev.db");
    let mut days: i64 = 14;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(14).clamp(1, 365);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Duka POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of sales history (default: 14)");
                println!("  -d, --db <PATH>    Database file path (default: ./duka_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Duka POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("History:  {} days", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.shops().list().await?.len();
    if existing > 0 {
        println!("⚠ Database already has {} shops", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let hash = hash_password(DEMO_PASSWORD)?;

    println!();
    println!("Creating shops, cashiers and products...");

    let mut roster: Vec<(Shop, Vec<Cashier>)> = Vec::new();
    for (shop_idx, (name, location)) in SHOPS.iter().enumerate() {
        let shop = Shop {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            location: Some(location.to_string()),
            created_at: now,
            updated_at: now,
        };
        db.shops().insert(&shop).await?;

        let mut cashiers = Vec::new();
        for (name, prefix) in CASHIERS[shop_idx] {
            let cashier = Cashier {
                id: Uuid::new_v4().to_string(),
                shop_id: shop.id.clone(),
                name: name.to_string(),
                email: format!("{prefix}@duka.co.ke"),
                phone: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            db.cashiers().insert(&cashier, &hash).await?;
            println!("  {} → {}", cashier.email, shop.name);
            cashiers.push(cashier);
        }

        for (product_idx, (name, category, buying, selling)) in PRODUCTS.iter().enumerate() {
            let product = Product {
                id: Uuid::new_v4().to_string(),
                shop_id: shop.id.clone(),
                name: name.to_string(),
                category: Some(category.to_string()),
                buying_price: Money::from_units(*buying),
                min_selling_price: Money::from_units(*selling),
                current_stock: 40 + ((shop_idx * 7 + product_idx * 13) % 120) as i64,
                min_stock_level: 10,
                created_at: now,
                updated_at: now,
            };
            db.products().insert(&product).await?;
        }

        roster.push((shop, cashiers));
    }

    println!("✓ {} shops, {} products each", roster.len(), PRODUCTS.len());

    println!();
    println!("Generating sales...");

    let start = std::time::Instant::now();
    let mut sales = 0usize;
    let mut credits = Vec::new();

    for day in (0..days).rev() {
        for (shop_idx, (shop, cashiers)) in roster.iter().enumerate() {
            let per_day = 3 + (day as usize + shop_idx) % 4;

            for n in 0..per_day {
                let seed = day as usize * 31 + shop_idx * 7 + n;
                let cashier = &cashiers[seed % cashiers.len()];
                let at = now - Duration::days(day) - Duration::minutes((n * 47) as i64);

                let catalog = db.products().list(Some(&shop.id)).await?;
                let lines = sale_lines(&catalog, seed);
                if lines.is_empty() {
                    continue;
                }

                let cart = match Cart::from_request(&shop.id, &catalog, &lines) {
                    Ok(cart) => cart,
                    Err(e) => {
                        eprintln!("Skipping sale: {}", e);
                        continue;
                    }
                };
                let tender = tender_for(&cart, seed, at.date_naive());

                let draft = match cart.checkout(&cashier.id, &tender, at) {
                    Ok(draft) => draft,
                    Err(e) => {
                        eprintln!("Skipping sale: {}", e);
                        continue;
                    }
                };
                if let Err(e) = db.transactions().record_sale(&draft).await {
                    eprintln!("Failed to record sale: {}", e);
                    continue;
                }

                if let Some(credit) = draft.credit {
                    credits.push(credit);
                }
                sales += 1;
            }
        }

        if day % 7 == 0 {
            for (shop, _) in &roster {
                for (category, description, amount) in WEEKLY_EXPENSES {
                    let expense = Expense {
                        id: Uuid::new_v4().to_string(),
                        shop_id: Some(shop.id.clone()),
                        category: category.to_string(),
                        description: Some(description.to_string()),
                        amount: Money::from_units(*amount),
                        expense_date: (now - Duration::days(day)).date_naive(),
                        created_at: now,
                    };
                    db.expenses().insert(&expense).await?;
                }
            }
        }
    }

    let rent = Expense {
        id: Uuid::new_v4().to_string(),
        shop_id: None,
        category: "Rent".to_string(),
        description: Some("Head office".to_string()),
        amount: Money::from_units(25_000),
        expense_date: now.date_naive(),
        created_at: now,
    };
    db.expenses().insert(&rent).await?;

    let elapsed = start.elapsed();
    println!("✓ Generated {} sales in {:?}", sales, elapsed);

    println!();
    println!("Recording credit repayments...");

    let mut repaid = 0;
    for (idx, credit) in credits.iter().enumerate() {
        if idx % 2 != 0 || !credit.balance_due.is_positive() {
            continue;
        }
        let amount = if idx % 4 == 0 {
            credit.balance_due
        } else {
            Money::from_cents(credit.balance_due.cents() / 2)
        };
        if !amount.is_positive() {
            continue;
        }

        match db
            .credits()
            .record_payment(&credit.id, amount, PaymentMethod::BankMpesa, None)
            .await
        {
            Ok(_) => repaid += 1,
            Err(e) => eprintln!("Failed to record payment for {}: {}", credit.id, e),
        }
    }

    let overdue = db.credits().mark_overdue(now.date_naive()).await?;
    println!(
        "✓ {} credits, {} repayments, {} overdue",
        credits.len(),
        repaid,
        overdue
    );

    println!();
    println!("✓ Seed complete! Cashier password: {}", DEMO_PASSWORD);

    Ok(())
}

/// One to three lines, skipping anything without enough stock.
fn sale_lines(catalog: &[Product], seed: usize) -> Vec<SaleLineRequest> {
    if catalog.is_empty() {
        return Vec::new();
    }

    let count = 1 + seed % 3;
    let mut lines: Vec<SaleLineRequest> = Vec::new();

    for k in 0..count {
        let product = &catalog[(seed * 7 + k * 5) % catalog.len()];
        let quantity = 1 + ((seed + k) % 4) as i64;
        if product.current_stock < quantity || lines.iter().any(|l| l.product_id == product.id) {
            continue;
        }

        // Every fifth line sells a little above the floor.
        let unit_price = (seed % 5 == 0)
            .then(|| product.min_selling_price + Money::from_units(5));

        lines.push(SaleLineRequest {
            product_id: product.id.clone(),
            quantity,
            unit_price,
        });
    }

    lines
}

/// Mostly cash and M-Pesa, with the odd split tender and credit sale.
fn tender_for(cart: &Cart, seed: usize, sale_day: NaiveDate) -> Tender {
    match seed % 10 {
        0..=3 => Tender::Cash,
        4..=6 => Tender::BankMpesa,
        7 | 8 => {
            let total = cart.total();
            let cash = Money::from_cents(total.cents() / 2);
            Tender::Split {
                cash_amount: cash,
                mpesa_amount: total - cash,
            }
        }
        _ => {
            let (name, phone) = CUSTOMERS[seed % CUSTOMERS.len()];
            Tender::Credit {
                customer_name: name.to_string(),
                customer_phone: Some(phone.to_string()),
                deposit: Money::from_cents(cart.total().cents() / 4),
                due_date: Some(sale_day + Duration::days(7)),
            }
        }
    }
}
