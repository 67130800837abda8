//! Sample raw-data generator
//!
//! Writes a directory of synthetic CSV exports in the layout the pipeline
//! consumes: `products.csv`, `branches.csv`, `inventory_snapshot.csv`, and one
//! `sales_YYYYMMDD.csv` per day. The inventory snapshot covers every
//! (branch, product) pair.
//!
//! Usage:
//!   generate_sample_data --out-dir data/raw
//!   generate_sample_data --out-dir data/raw --products 100 --branches 10 \
//!     --days 45 --start-date 2025-07-01 --seed 42

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use retail_etl::records::{Branch, InventoryRecord, Product, SaleRecord};

const CATEGORIES: &[&str] = &[
    "Electronics",
    "Apparel",
    "Groceries",
    "Homeware",
    "Toys",
    "Automotive",
    "Health",
];

const PROVINCES: &[&str] = &[
    "Gauteng",
    "Western Cape",
    "KwaZulu-Natal",
    "Eastern Cape",
    "Limpopo",
    "Mpumalanga",
    "Northern Cape",
    "Free State",
    "North West",
];

const PRODUCT_WORDS: &[&str] = &[
    "Alpine", "Brass", "Cedar", "Delta", "Ember", "Field", "Granite", "Harbor", "Ivory",
    "Juniper", "Kettle", "Lunar", "Maple", "Nimbus", "Orchard", "Pebble", "Quartz", "River",
    "Summit", "Timber",
];

const CITIES: &[&str] = &[
    "Johannesburg",
    "Cape Town",
    "Durban",
    "Pretoria",
    "Gqeberha",
    "Bloemfontein",
    "Polokwane",
    "Nelspruit",
    "Kimberley",
    "Mahikeng",
];

/// Generate synthetic raw CSV exports for the retail ETL pipeline
#[derive(Parser, Debug)]
#[command(name = "generate_sample_data")]
struct Args {
    /// Directory to write the CSV files into (created if missing)
    #[arg(long, default_value = "data/raw")]
    out_dir: PathBuf,

    /// Number of catalog products
    #[arg(long, default_value_t = 100)]
    products: usize,

    /// Number of branches
    #[arg(long, default_value_t = 10)]
    branches: usize,

    /// Number of daily sales files
    #[arg(long, default_value_t = 45)]
    days: u32,

    /// First sales date
    #[arg(long, default_value = "2025-07-01")]
    start_date: NaiveDate,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn write_csv<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn generate(args: &Args, rng: &mut StdRng) -> Result<()> {
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let products: Vec<Product> = (1..=args.products as i32)
        .map(|id| Product {
            product_id: id,
            product_name: format!("{} {}", pick(rng, PRODUCT_WORDS), pick(rng, PRODUCT_WORDS)),
            category: pick(rng, CATEGORIES).to_string(),
            // 5.00 to 5000.00, two decimal places
            price: Decimal::new(rng.gen_range(500..=500_000), 2),
        })
        .collect();
    write_csv(&args.out_dir.join("products.csv"), &products)?;

    let branches: Vec<Branch> = (1..=args.branches as i32)
        .map(|id| Branch {
            branch_id: id,
            branch_name: format!("Branch {}", pick(rng, CITIES)),
            location: pick(rng, PROVINCES).to_string(),
        })
        .collect();
    write_csv(&args.out_dir.join("branches.csv"), &branches)?;

    // One snapshot row per (branch, product) pair.
    let mut inventory = Vec::with_capacity(branches.len() * products.len());
    for branch in &branches {
        for product in &products {
            inventory.push(InventoryRecord {
                branch_id: branch.branch_id,
                product_id: product.product_id,
                stock_on_hand: rng.gen_range(0..200),
            });
        }
    }
    write_csv(&args.out_dir.join("inventory_snapshot.csv"), &inventory)?;

    let mut transaction_counter = 0u64;
    for offset in 0..args.days {
        let day = args.start_date + Duration::days(i64::from(offset));
        let transactions = rng.gen_range(50..200);

        let sales: Vec<SaleRecord> = (0..transactions)
            .map(|_| {
                transaction_counter += 1;
                SaleRecord {
                    transaction_id: format!("T-{transaction_counter:08}"),
                    product_id: rng.gen_range(1..=args.products as i32),
                    branch_id: rng.gen_range(1..=args.branches as i32),
                    quantity_sold: rng.gen_range(1..6),
                    transaction_time: day.and_time(NaiveTime::MIN)
                        + Duration::seconds(rng.gen_range(0..86_400)),
                }
            })
            .collect();

        let filename = format!("sales_{}.csv", day.format("%Y%m%d"));
        write_csv(&args.out_dir.join(filename), &sales)?;
    }

    println!(
        "wrote {} products, {} branches, {} inventory rows, {} sales files to {}",
        products.len(),
        branches.len(),
        inventory.len(),
        args.days,
        args.out_dir.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate(&args, &mut rng)
}
