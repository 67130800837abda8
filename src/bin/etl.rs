//! ETL command-line entry point
//!
//! Usage:
//!   etl --data-dir data/raw --init-schema
//!   etl --data-dir data/raw --snapshot-date 2025-07-01 --drop-unresolved
//!
//! The warehouse connection comes from `--database-url`, then `DATABASE_URL`,
//! then the `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME` variables.
//! Exits non-zero on any pipeline failure; the load itself either commits
//! fully or rolls back.

use std::env;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;

use retail_etl::config::{self, WarehouseConfig};
use retail_etl::database::{ensure_schema, LoadOptions, UnresolvedKeyPolicy, WarehouseLoader};
use retail_etl::extract::CsvRecordSource;
use retail_etl::pipeline::EtlPipeline;
use retail_etl::transform::SnapshotDatePolicy;

/// Full-refresh star-schema load of the retail warehouse
#[derive(Parser, Debug)]
#[command(name = "etl")]
struct Args {
    /// Directory holding the raw CSV exports
    #[arg(long, default_value = "data/raw")]
    data_dir: PathBuf,

    /// Warehouse connection URL (falls back to DATABASE_URL, then DB_* vars)
    #[arg(long)]
    database_url: Option<String>,

    /// Stamp the inventory snapshot with this date instead of the earliest
    /// observed sales date
    #[arg(long)]
    snapshot_date: Option<NaiveDate>,

    /// Drop fact rows with unresolved dimension keys instead of aborting
    #[arg(long)]
    drop_unresolved: bool,

    /// Skip the advisory lock guarding against concurrent loads
    #[arg(long)]
    no_lock: bool,

    /// Create the warehouse tables if they do not exist
    #[arg(long)]
    init_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let url = match args.database_url.or_else(|| env::var("DATABASE_URL").ok()) {
        Some(url) => url,
        None => WarehouseConfig::from_env()
            .context("no --database-url, DATABASE_URL, or DB_* configuration")?
            .url(),
    };
    let pool = config::connect(&url)
        .await
        .context("failed to connect to the warehouse")?;

    if args.init_schema {
        ensure_schema(&pool)
            .await
            .context("failed to create warehouse tables")?;
    }

    let options = LoadOptions {
        unresolved_keys: if args.drop_unresolved {
            UnresolvedKeyPolicy::DropAndReport
        } else {
            UnresolvedKeyPolicy::Reject
        },
        exclusive_lock: !args.no_lock,
    };

    let snapshot_date = args
        .snapshot_date
        .map(SnapshotDatePolicy::Explicit)
        .unwrap_or_default();

    let pipeline = EtlPipeline::new(
        CsvRecordSource::new(args.data_dir),
        WarehouseLoader::with_options(pool, options),
    )
    .with_snapshot_date(snapshot_date);

    let report = pipeline.run().await.context("ETL pipeline failed")?;

    if !report.dropped.is_empty() {
        eprintln!(
            "warning: dropped {} fact rows with unresolved keys",
            report.dropped.len()
        );
        for fact in &report.dropped {
            eprintln!(
                "  {} date_key={} product_id={} branch_id={}",
                fact.table, fact.date_key, fact.product_id, fact.branch_id
            );
        }
    }

    println!(
        "loaded {} products, {} branches, {} dates, {} sale facts, {} inventory facts",
        report.dim_product_rows,
        report.dim_branch_rows,
        report.dim_date_rows,
        report.fact_sales_rows,
        report.fact_inventory_rows
    );
    Ok(())
}
