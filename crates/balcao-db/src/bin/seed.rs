//! # Seed Data Generator
//!
//! Populates the database with a small neighborhood-store catalog, a few
//! regular customers, and a realistic payment-method configuration for
//! development.
//!
//! ## Usage
//! ```bash
//! # Default database path (./balcao_dev.db)
//! cargo run -p balcao-db --bin seed
//!
//! # Specify database path
//! cargo run -p balcao-db --bin seed -- --db ./data/balcao.db
//! ```

use chrono::Utc;
use std::env;

use balcao_core::{
    Adjustment, Customer, FeeResponsibility, MethodConfig, Product, TenderKind,
};
use balcao_db::{Database, DbConfig};
use uuid::Uuid;

/// (sku, name, price in cents, stock)
const PRODUCTS: &[(&str, &str, i64, i64)] = &[
    ("BEB-001", "Coca-Cola Lata 350ml", 550, 120),
    ("BEB-002", "Guaraná Antarctica 2L", 950, 48),
    ("BEB-003", "Água Mineral 500ml", 300, 200),
    ("BEB-004", "Suco de Laranja 1L", 1190, 30),
    ("BEB-005", "Cerveja Brahma Lata 350ml", 480, 96),
    ("PAD-001", "Pão Francês (unidade)", 90, 300),
    ("PAD-002", "Pão de Queijo (100g)", 450, 80),
    ("PAD-003", "Bolo de Fubá (fatia)", 600, 24),
    ("MER-001", "Arroz Branco 5kg", 2890, 40),
    ("MER-002", "Feijão Carioca 1kg", 899, 60),
    ("MER-003", "Óleo de Soja 900ml", 749, 55),
    ("MER-004", "Açúcar Refinado 1kg", 519, 70),
    ("MER-005", "Café Torrado 500g", 1790, 45),
    ("MER-006", "Macarrão Espaguete 500g", 429, 90),
    ("LIM-001", "Detergente 500ml", 289, 75),
    ("LIM-002", "Sabão em Pó 1kg", 1249, 35),
    ("LAT-001", "Leite Integral 1L", 599, 110),
    ("LAT-002", "Queijo Mussarela (200g)", 1150, 25),
    ("LAT-003", "Manteiga 200g", 1390, 20),
    ("DOC-001", "Chocolate ao Leite 90g", 799, 64),
];

/// (name, phone)
const CUSTOMERS: &[(&str, &str)] = &[
    ("Maria Aparecida", "+55 11 98765-0001"),
    ("João Batista", "+55 11 98765-0002"),
    ("Dona Lurdes", "+55 11 98765-0003"),
    ("Seu Antônio", "+55 11 98765-0004"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./balcao_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Balcão POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./balcao_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Balcão POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding catalog...");

    let now = Utc::now();
    for (sku, name, price_cents, stock) in PRODUCTS {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            price_cents: *price_cents,
            stock: *stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
    }
    println!("✓ {} products", PRODUCTS.len());

    for (name, phone) in CUSTOMERS {
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: Some(phone.to_string()),
            created_at: now,
        };
        db.customers().insert(&customer).await?;
    }
    println!("✓ {} customers", CUSTOMERS.len());

    // Typical machine fees: credit passes 3% on to the customer, debit
    // costs the store a flat R$0.40 per transaction.
    db.payment_config()
        .set_method(
            TenderKind::Credit,
            MethodConfig {
                enabled: true,
                fee: Adjustment::Percent(300),
                fee_responsibility: FeeResponsibility::Customer,
            },
        )
        .await?;
    db.payment_config()
        .set_method(
            TenderKind::Debit,
            MethodConfig {
                enabled: true,
                fee: Adjustment::Fixed(40),
                fee_responsibility: FeeResponsibility::Store,
            },
        )
        .await?;
    println!("✓ Payment fees configured (credit 3% customer, debit R$0.40 store)");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
