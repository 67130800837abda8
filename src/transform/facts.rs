//! Fact builder
//!
//! Pure derivation of the two fact tables from raw records plus the
//! already-built date dimension. Fact rows keep their business keys here;
//! surrogate-key resolution happens at load time because surrogate keys do not
//! exist until the warehouse assigns them on insert.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EtlError, Result};
use crate::records::RawDataset;
use crate::transform::dimensions::{date_key, Dimensions};

/// Which date the inventory snapshot is stamped with.
///
/// The snapshot carries no per-row timestamp, so every inventory fact shares
/// one date key. The default treats the snapshot as taken at the start of the
/// observed sales window; callers with a known snapshot date supply it
/// explicitly instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotDatePolicy {
    /// Stamp with the earliest date present in the date dimension.
    #[default]
    EarliestSaleDate,
    /// Stamp with this date.
    Explicit(NaiveDate),
}

/// One sale fact, one row per input sale record. No aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct FactSale {
    pub date_key: i32,
    pub product_id: i32,
    pub branch_id: i32,
    pub quantity_sold: i32,
    pub sale_amount: Decimal,
}

/// One inventory fact, one row per snapshot row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactInventory {
    pub date_key: i32,
    pub product_id: i32,
    pub branch_id: i32,
    pub stock_on_hand: i32,
}

/// The two fact tables of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Facts {
    pub sales: Vec<FactSale>,
    pub inventory: Vec<FactInventory>,
}

/// Build the two fact tables.
///
/// Sales join to the product catalog by business key to price each line;
/// a sale whose product is missing fails the whole build rather than being
/// dropped or nulled. Each sale's date key comes from its own transaction
/// date, so it is guaranteed to exist in the date dimension built from the
/// same sales records.
pub fn build_facts(
    raw: &RawDataset,
    dims: &Dimensions,
    snapshot_date: SnapshotDatePolicy,
) -> Result<Facts> {
    let price_by_product: HashMap<i32, Decimal> = raw
        .products
        .iter()
        .map(|p| (p.product_id, p.price))
        .collect();

    let mut sales = Vec::with_capacity(raw.sales.len());
    for record in &raw.sales {
        let price = price_by_product
            .get(&record.product_id)
            .copied()
            .ok_or_else(|| EtlError::UnknownProduct {
                transaction_id: record.transaction_id.clone(),
                product_id: record.product_id,
            })?;
        sales.push(FactSale {
            date_key: date_key(record.transaction_time.date()),
            product_id: record.product_id,
            branch_id: record.branch_id,
            quantity_sold: record.quantity_sold,
            sale_amount: Decimal::from(record.quantity_sold) * price,
        });
    }

    let snapshot_key = match snapshot_date {
        SnapshotDatePolicy::Explicit(date) => date_key(date),
        SnapshotDatePolicy::EarliestSaleDate => dims
            .dates
            .iter()
            .map(|d| d.date_key)
            .min()
            .ok_or(EtlError::EmptyDataset { entity: "sales" })?,
    };
    debug!(snapshot_key, "stamping inventory snapshot");

    let inventory = raw
        .inventory
        .iter()
        .map(|row| FactInventory {
            date_key: snapshot_key,
            product_id: row.product_id,
            branch_id: row.branch_id,
            stock_on_hand: row.stock_on_hand,
        })
        .collect();

    Ok(Facts { sales, inventory })
}
