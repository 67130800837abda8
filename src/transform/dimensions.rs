//! Dimension builder
//!
//! Pure projection of raw records into the three dimension tables. Rows are
//! keyed by business key until the warehouse assigns surrogate keys at load
//! time. Product and branch rows are copied as-is: duplicate business keys in
//! the source are a data-quality fault for the warehouse's unique constraints
//! to catch, not something to silently repair here.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::records::RawDataset;

/// Product dimension row, pre-surrogate-key.
#[derive(Debug, Clone, PartialEq)]
pub struct DimProduct {
    pub product_id: i32,
    pub product_name: String,
    pub category: String,
    pub price: rust_decimal::Decimal,
}

/// Branch dimension row, pre-surrogate-key.
#[derive(Debug, Clone, PartialEq)]
pub struct DimBranch {
    pub branch_id: i32,
    pub branch_name: String,
    pub location: String,
}

/// Date dimension row. `date_key` is the YYYYMMDD integer encoding of
/// `full_date` and doubles as the warehouse primary key, so it is assigned
/// here rather than by the warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimDate {
    pub date_key: i32,
    pub full_date: NaiveDate,
    pub year: i32,
    pub quarter: i16,
    pub month: i16,
    pub day: i16,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: i16,
}

/// The three dimension tables of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    pub products: Vec<DimProduct>,
    pub branches: Vec<DimBranch>,
    pub dates: Vec<DimDate>,
}

/// Encode a calendar date as its YYYYMMDD integer key.
///
/// Injective over all representable dates: distinct dates always yield
/// distinct keys, and keys sort in calendar order.
pub fn date_key(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

/// Derive the full calendar attribute row for one date.
pub fn dim_date_for(date: NaiveDate) -> DimDate {
    DimDate {
        date_key: date_key(date),
        full_date: date,
        year: date.year(),
        quarter: (date.month0() / 3 + 1) as i16,
        month: date.month() as i16,
        day: date.day() as i16,
        day_of_week: date.weekday().num_days_from_monday() as i16,
    }
}

/// Build the three dimension tables from raw records.
///
/// The date dimension covers exactly the distinct calendar dates appearing in
/// the sales records (time-of-day stripped), sorted ascending so repeated runs
/// over the same input produce identical tables. No sentinel "unknown date"
/// row is created.
pub fn build_dimensions(raw: &RawDataset) -> Dimensions {
    let products = raw
        .products
        .iter()
        .map(|p| DimProduct {
            product_id: p.product_id,
            product_name: p.product_name.clone(),
            category: p.category.clone(),
            price: p.price,
        })
        .collect();

    let branches = raw
        .branches
        .iter()
        .map(|b| DimBranch {
            branch_id: b.branch_id,
            branch_name: b.branch_name.clone(),
            location: b.location.clone(),
        })
        .collect();

    let distinct_dates: BTreeSet<NaiveDate> = raw
        .sales
        .iter()
        .map(|s| s.transaction_time.date())
        .collect();
    let dates = distinct_dates.into_iter().map(dim_date_for).collect();

    Dimensions {
        products,
        branches,
        dates,
    }
}
