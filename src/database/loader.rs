//! Transactional full-refresh warehouse loader
//!
//! The only stateful component of the pipeline. One call to
//! [`WarehouseLoader::load`] runs the whole refresh inside a single
//! transaction:
//!
//! 1. take a fail-fast advisory lock on the target tables (optional),
//! 2. truncate all five tables, restarting surrogate-key sequences,
//! 3. insert dimension rows (the warehouse assigns surrogate keys),
//! 4. re-read the warehouse-assigned keys into business-key maps,
//! 5. resolve fact business keys and insert fact rows,
//! 6. commit.
//!
//! Any failure rolls the whole transaction back, leaving the warehouse
//! exactly as it was before the run. Re-running with identical input yields
//! an identical final state, surrogate keys renumbered from 1.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, warn};

use crate::database::locks;
use crate::error::{EtlError, Result};
use crate::transform::{Dimensions, Facts, StarSchema};

/// Advisory-lock namespace covering the five target tables.
const LOAD_LOCK_NAMESPACE: &str = "retail_etl.full_refresh";

/// What to do with a fact row whose business key has no dimension row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedKeyPolicy {
    /// Abort the whole load and roll back. The referential-integrity
    /// invariant holds or nothing is committed.
    #[default]
    Reject,
    /// Skip the offending row, record it in [`LoadReport::dropped`], and
    /// load the rest.
    DropAndReport,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub unresolved_keys: UnresolvedKeyPolicy,
    /// Guard against concurrent full-refresh runs with a transaction-scoped
    /// advisory lock. Fail-fast: a second run errors instead of queueing.
    pub exclusive_lock: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            unresolved_keys: UnresolvedKeyPolicy::Reject,
            exclusive_lock: true,
        }
    }
}

/// A fact row skipped under [`UnresolvedKeyPolicy::DropAndReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFact {
    pub table: &'static str,
    pub date_key: i32,
    pub product_id: i32,
    pub branch_id: i32,
}

/// Row counts of a committed load, plus any rows dropped under the lenient
/// resolution policy.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub dim_product_rows: u64,
    pub dim_branch_rows: u64,
    pub dim_date_rows: u64,
    pub fact_sales_rows: u64,
    pub fact_inventory_rows: u64,
    pub dropped: Vec<DroppedFact>,
}

/// Business-key to surrogate-key maps re-read from the warehouse after the
/// dimension insert. They cannot be known earlier: the warehouse, not the
/// builder, assigns surrogate keys.
struct KeyMaps {
    products: HashMap<i32, i32>,
    branches: HashMap<i32, i32>,
}

#[derive(Debug)]
struct ResolvedSale {
    date_key: i32,
    product_key: i32,
    branch_key: i32,
    quantity_sold: i32,
    sale_amount: rust_decimal::Decimal,
}

#[derive(Debug)]
struct ResolvedInventory {
    date_key: i32,
    product_key: i32,
    branch_key: i32,
    stock_on_hand: i32,
}

#[derive(Debug)]
struct ResolvedFacts {
    sales: Vec<ResolvedSale>,
    inventory: Vec<ResolvedInventory>,
    dropped: Vec<DroppedFact>,
}

/// Resolve fact business keys against the warehouse-assigned key maps.
///
/// Pure; policy decides whether a miss aborts or drops the row.
fn resolve_facts(
    facts: &Facts,
    keys: &KeyMaps,
    policy: UnresolvedKeyPolicy,
) -> Result<ResolvedFacts> {
    let mut resolved = ResolvedFacts {
        sales: Vec::with_capacity(facts.sales.len()),
        inventory: Vec::with_capacity(facts.inventory.len()),
        dropped: Vec::new(),
    };

    for row in &facts.sales {
        match (
            keys.products.get(&row.product_id),
            keys.branches.get(&row.branch_id),
        ) {
            (Some(&product_key), Some(&branch_key)) => resolved.sales.push(ResolvedSale {
                date_key: row.date_key,
                product_key,
                branch_key,
                quantity_sold: row.quantity_sold,
                sale_amount: row.sale_amount,
            }),
            _ => resolved.dropped.push(DroppedFact {
                table: "fact_sales",
                date_key: row.date_key,
                product_id: row.product_id,
                branch_id: row.branch_id,
            }),
        }
    }

    for row in &facts.inventory {
        match (
            keys.products.get(&row.product_id),
            keys.branches.get(&row.branch_id),
        ) {
            (Some(&product_key), Some(&branch_key)) => {
                resolved.inventory.push(ResolvedInventory {
                    date_key: row.date_key,
                    product_key,
                    branch_key,
                    stock_on_hand: row.stock_on_hand,
                });
            }
            _ => resolved.dropped.push(DroppedFact {
                table: "fact_inventory",
                date_key: row.date_key,
                product_id: row.product_id,
                branch_id: row.branch_id,
            }),
        }
    }

    if policy == UnresolvedKeyPolicy::Reject {
        if let Some(first) = resolved.dropped.first() {
            return Err(EtlError::UnresolvedKeys {
                table: first.table,
                count: resolved.dropped.len(),
                first: format!(
                    "product_id={} branch_id={}",
                    first.product_id, first.branch_id
                ),
            });
        }
    }

    Ok(resolved)
}

/// Performs the full-refresh load against one Postgres warehouse.
#[derive(Clone, Debug)]
pub struct WarehouseLoader {
    pool: PgPool,
    options: LoadOptions,
}

impl WarehouseLoader {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            options: LoadOptions::default(),
        }
    }

    pub fn with_options(pool: PgPool, options: LoadOptions) -> Self {
        Self { pool, options }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Load the star schema as one atomic full refresh.
    ///
    /// On success the warehouse holds exactly the given schema; on any error
    /// the transaction is rolled back and the prior contents remain.
    pub async fn load(&self, schema: &StarSchema) -> Result<LoadReport> {
        let mut tx = self.pool.begin().await?;

        if self.options.exclusive_lock {
            let key = locks::lock_key(LOAD_LOCK_NAMESPACE);
            if !locks::try_advisory_xact_lock(&mut tx, key).await? {
                let _ = tx.rollback().await;
                return Err(EtlError::LoadInProgress);
            }
        }

        truncate_targets(&mut tx).await?;
        insert_dimensions(&mut tx, &schema.dimensions).await?;
        let keys = read_key_maps(&mut tx).await?;

        let resolved = match resolve_facts(&schema.facts, &keys, self.options.unresolved_keys) {
            Ok(resolved) => resolved,
            Err(e) => {
                let _ = tx.rollback().await;
                return Err(e);
            }
        };
        if !resolved.dropped.is_empty() {
            warn!(
                dropped = resolved.dropped.len(),
                "dropped fact rows with unresolved dimension keys"
            );
        }

        insert_facts(&mut tx, &resolved).await?;
        tx.commit().await?;

        let report = LoadReport {
            dim_product_rows: schema.dimensions.products.len() as u64,
            dim_branch_rows: schema.dimensions.branches.len() as u64,
            dim_date_rows: schema.dimensions.dates.len() as u64,
            fact_sales_rows: resolved.sales.len() as u64,
            fact_inventory_rows: resolved.inventory.len() as u64,
            dropped: resolved.dropped,
        };
        info!(
            products = report.dim_product_rows,
            branches = report.dim_branch_rows,
            dates = report.dim_date_rows,
            sales = report.fact_sales_rows,
            inventory = report.fact_inventory_rows,
            "warehouse load committed"
        );
        Ok(report)
    }
}

/// Empty all five target tables and restart the surrogate-key sequences, so
/// repeated runs never accumulate duplicates and keys renumber from 1.
async fn truncate_targets(tx: &mut Transaction<'_, Postgres>) -> Result<()> {
    sqlx::query(
        "TRUNCATE fact_sales, fact_inventory, dim_product, dim_branch, dim_date \
         RESTART IDENTITY CASCADE",
    )
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_dimensions(
    tx: &mut Transaction<'_, Postgres>,
    dims: &Dimensions,
) -> Result<()> {
    for p in &dims.products {
        sqlx::query(
            "INSERT INTO dim_product (product_id, product_name, category, price) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(p.product_id)
        .bind(&p.product_name)
        .bind(&p.category)
        .bind(p.price)
        .execute(&mut **tx)
        .await?;
    }

    for b in &dims.branches {
        sqlx::query(
            "INSERT INTO dim_branch (branch_id, branch_name, location) VALUES ($1, $2, $3)",
        )
        .bind(b.branch_id)
        .bind(&b.branch_name)
        .bind(&b.location)
        .execute(&mut **tx)
        .await?;
    }

    for d in &dims.dates {
        sqlx::query(
            "INSERT INTO dim_date (date_key, full_date, year, quarter, month, day, day_of_week) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(d.date_key)
        .bind(d.full_date)
        .bind(d.year)
        .bind(d.quarter)
        .bind(d.month)
        .bind(d.day)
        .bind(d.day_of_week)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// The key re-read: fetch the surrogate keys the warehouse just assigned,
/// keyed by business key. Runs inside the load transaction so it sees the
/// uncommitted dimension rows.
async fn read_key_maps(tx: &mut Transaction<'_, Postgres>) -> Result<KeyMaps> {
    let products: Vec<(i32, i32)> =
        sqlx::query_as("SELECT product_id, product_key FROM dim_product")
            .fetch_all(&mut **tx)
            .await?;
    let branches: Vec<(i32, i32)> =
        sqlx::query_as("SELECT branch_id, branch_key FROM dim_branch")
            .fetch_all(&mut **tx)
            .await?;

    Ok(KeyMaps {
        products: products.into_iter().collect(),
        branches: branches.into_iter().collect(),
    })
}

async fn insert_facts(
    tx: &mut Transaction<'_, Postgres>,
    resolved: &ResolvedFacts,
) -> Result<()> {
    for s in &resolved.sales {
        sqlx::query(
            "INSERT INTO fact_sales (date_key, product_key, branch_key, quantity_sold, sale_amount) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(s.date_key)
        .bind(s.product_key)
        .bind(s.branch_key)
        .bind(s.quantity_sold)
        .bind(s.sale_amount)
        .execute(&mut **tx)
        .await?;
    }

    for i in &resolved.inventory {
        sqlx::query(
            "INSERT INTO fact_inventory (date_key, product_key, branch_key, stock_on_hand) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(i.date_key)
        .bind(i.product_key)
        .bind(i.branch_key)
        .bind(i.stock_on_hand)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
