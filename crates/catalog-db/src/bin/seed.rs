//! # Catalog Seed Tool
//!
//! Creates (or migrates) a catalog database and fills it with the
//! preconfigured catalog plus generated items.
//!
//! ## Usage
//! ```bash
//! # Preconfigured catalog + 500 generated items (default)
//! cargo run -p catalog-db --bin seed
//!
//! # Custom amount and block size
//! cargo run -p catalog-db --bin seed -- --count 5000 --block-size 100
//!
//! # Specify database path
//! cargo run -p catalog-db --bin seed -- --db ./data/catalog.db
//! ```
//!
//! ## Generated Items
//! Each generated item combines a product line with a variant, e.g.
//! "Roslyn Hoodie XL". Type and brand cycle through the standard lookups;
//! price and stock are derived from the item's position so reruns against
//! a fresh file produce the same catalog.

use catalog_core::{CatalogItem, Money, DEFAULT_HILO_BLOCK_SIZE};
use catalog_db::{seed, CatalogRepository, Database, DbConfig};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (product line, type id)
const LINES: &[(&str, i32)] = &[
    ("Bot Mug", 1),
    ("Roslyn Hoodie", 2),
    ("Kudu T-Shirt", 2),
    ("Prism Sheet", 3),
    ("Cup<T> Sticker Sheet", 3),
    ("Blazor USB Stick", 4),
];

const VARIANTS: &[&str] = &["S", "M", "L", "XL", "Black", "White", "Blue", "Red"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,catalog=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut block_size = DEFAULT_HILO_BLOCK_SIZE;
    let mut db_path = String::from("./catalog_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--block-size" | "-b" => {
                if i + 1 < args.len() {
                    block_size = args[i + 1].parse().unwrap_or(block_size);
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
                println!("Catalog Seed Tool");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>        Generated items on top of the preconfigured 12 (default: 500)");
                println!("  -b, --block-size <N>   Hi/Lo block size (default: {})", DEFAULT_HILO_BLOCK_SIZE);
                println!("  -d, --db <PATH>        Database file path (default: ./catalog_dev.db)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(db = %db_path, count, block_size, "Seeding catalog");

    let db = Database::new(DbConfig::new(&db_path).hilo_block_size(block_size)).await?;
    let repo = db.catalog();

    let seeded = seed::seed_if_empty(&db).await?;
    if seeded == 0 {
        println!(
            "Database already has {} items; skipping. Delete the file to regenerate.",
            repo.count().await?
        );
        db.close().await;
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    for n in 0..count {
        let item = generate_item(n);
        match repo.create(item).await {
            Ok(_) => generated += 1,
            Err(e) => {
                warn!(error = %e, index = n, "Failed to create item");
                continue;
            }
        }

        if generated % 100 == 0 {
            info!(generated, "Progress");
        }
    }

    let elapsed = start.elapsed();
    println!("Preconfigured items: {}", seeded);
    println!("Generated items:     {} in {:?}", generated, elapsed);
    println!(
        "Rate:                {:.0} items/second",
        generated as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!(
        "Hi/Lo refills:       {} (block size {})",
        db.allocator().refill_count(),
        block_size
    );

    let first_page = repo.list_paginated(10, 0).await?;
    println!(
        "Total items:         {} ({} pages of 10)",
        first_page.count,
        first_page.total_pages()
    );

    db.close().await;
    Ok(())
}

/// Builds the n-th generated item.
fn generate_item(n: usize) -> CatalogItem {
    let (line, type_id) = LINES[n % LINES.len()];
    let variant = VARIANTS[(n / LINES.len()) % VARIANTS.len()];
    let brand_id = (n % 5) as i32 + 1;

    // 4.99 - 24.98
    let cents = 499 + ((n * 37) % 2000) as i64;
    let name = format!("{} {} #{}", line, variant, n + 1);

    let mut item = CatalogItem::new(name, Money::from_cents(cents), type_id, brand_id);
    item.available_stock = (n % 120) as i32;
    item.restock_threshold = 10;
    item.max_stock_threshold = 200;
    item.on_reorder = item.available_stock < item.restock_threshold;
    item
}
