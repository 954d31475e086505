//! # Seed Data Generator
//!
//! Populates a database with demo data: a product catalogue, an open
//! register session and a couple of recorded sales.
//!
//! ## Usage
//! ```bash
//! cargo run -p mostrador-db --bin seed
//! cargo run -p mostrador-db --bin seed -- --db ./data/mostrador.db
//! ```

use std::env;

use mostrador_core::{
    Money, NewProduct, NewSale, NewSaleLine, PaymentMethod, Quantity,
};
use mostrador_db::{Database, DbConfig};

/// (name, unit, cost cents, initial stock millis, sale price cents)
const CATALOGUE: &[(&str, &str, i64, i64, i64)] = &[
    ("Arroz", "kg", 120, 50_000, 180),
    ("Azúcar", "kg", 95, 40_000, 150),
    ("Aceite", "litro", 310, 24_000, 420),
    ("Harina", "kg", 80, 30_000, 130),
    ("Fideos", "unidad", 60, 48_000, 100),
    ("Leche", "litro", 90, 36_000, 140),
    ("Gaseosa 2L", "unidad", 150, 20_000, 250),
    ("Jabón", "unidad", 70, 60_000, 120),
    ("Detergente", "litro", 180, 15_000, 280),
    ("Kerosene", "litro", 200, 100_000, 320),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_path = parse_db_arg().unwrap_or_else(|| "./mostrador.db".to_string());

    println!("Seeding database at {db_path}");
    let db = Database::new(DbConfig::new(&db_path)).await?;

    // Products with their inicial movements
    let stock = db.stock_ledger();
    let mut products = Vec::new();
    for (name, unit, cost, initial, _) in CATALOGUE {
        let product = stock
            .register_product(NewProduct {
                name: name.to_string(),
                unit: unit.to_string(),
                cost: Money::from_cents(*cost),
                initial_stock: Quantity::from_millis(*initial),
            })
            .await?;
        products.push(product);
    }
    println!("  {} products registered", products.len());

    // Open a register session with a starting float
    let cash = db.cash_service();
    let register = cash
        .open_register(Some(Money::from_major(100)), Some("Caja de prueba".to_string()))
        .await?;
    println!("  register {} opened", register.id);

    // A cash sale and a card sale
    let sales = db.sale_service();
    let cash_sale = sales
        .create_sale(NewSale::new(
            vec![
                NewSaleLine::new(
                    products[0].id.clone(),
                    Quantity::from_units(2),
                    Money::from_cents(180),
                ),
                NewSaleLine::new(
                    products[2].id.clone(),
                    Quantity::from_units(1),
                    Money::from_cents(420),
                ),
            ],
            PaymentMethod::Efectivo,
        ))
        .await?;
    println!(
        "  sale {} recorded ({})",
        cash_sale.sale.number, cash_sale.sale.grand_total
    );

    let card_sale = sales
        .create_sale(NewSale::new(
            vec![NewSaleLine::new(
                products[6].id.clone(),
                Quantity::from_units(3),
                Money::from_cents(250),
            )],
            PaymentMethod::Tarjeta,
        ))
        .await?;
    println!(
        "  sale {} recorded ({})",
        card_sale.sale.number, card_sale.sale.grand_total
    );

    let detail = cash.detail(&register.id).await?;
    println!(
        "  register expects {} across {} movements",
        detail.expected_amount,
        detail.movements.len()
    );

    db.close().await;
    println!("Done.");
    Ok(())
}

fn parse_db_arg() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1).cloned())
}
