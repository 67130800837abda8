//! Star-schema transforms
//!
//! Pure, in-memory derivation of the dimensional model from raw records.
//! No side effects and no I/O; for fixed inputs the output tables are
//! identical across invocations.

pub mod dimensions;
pub mod facts;

pub use dimensions::{
    build_dimensions, date_key, dim_date_for, DimBranch, DimDate, DimProduct, Dimensions,
};
pub use facts::{build_facts, FactInventory, FactSale, Facts, SnapshotDatePolicy};

use crate::error::Result;
use crate::records::RawDataset;

/// The complete in-memory star schema for one run: three dimension tables and
/// two fact tables, keyed by business key until loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct StarSchema {
    pub dimensions: Dimensions,
    pub facts: Facts,
}

/// Run both builders in order: dimensions first, then facts against the
/// date dimension they produced.
///
/// An explicit snapshot date outside the sales window gains its own date
/// row here, keeping the date dimension complete with respect to every fact
/// row's date key before the warehouse FK sees them.
pub fn transform(raw: &RawDataset, snapshot_date: SnapshotDatePolicy) -> Result<StarSchema> {
    let mut dimensions = build_dimensions(raw);

    if let SnapshotDatePolicy::Explicit(date) = snapshot_date {
        let key = date_key(date);
        if !dimensions.dates.iter().any(|d| d.date_key == key) {
            let pos = dimensions.dates.partition_point(|d| d.date_key < key);
            dimensions.dates.insert(pos, dim_date_for(date));
        }
    }

    let facts = build_facts(raw, &dimensions, snapshot_date)?;
    Ok(StarSchema { dimensions, facts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::testing::{date, reference_dataset};

    #[test]
    fn test_reference_scenario_end_to_end() {
        let schema = transform(&reference_dataset(), SnapshotDatePolicy::default()).unwrap();

        assert_eq!(schema.dimensions.dates.len(), 1);
        assert_eq!(schema.dimensions.dates[0].date_key, 20250701);
        assert_eq!(schema.dimensions.products.len(), 2);
        assert_eq!(schema.dimensions.branches.len(), 1);
        assert_eq!(schema.facts.sales.len(), 3);
        assert_eq!(schema.facts.inventory.len(), 2);
        assert!(schema.facts.inventory.iter().all(|r| r.date_key == 20250701));
    }

    #[test]
    fn test_explicit_snapshot_date_outside_sales_window_gets_a_date_row() {
        // All sales are on 2025-07-01; the snapshot date predates them.
        let schema = transform(
            &reference_dataset(),
            SnapshotDatePolicy::Explicit(date(2025, 6, 1)),
        )
        .unwrap();

        let keys: Vec<i32> = schema.dimensions.dates.iter().map(|d| d.date_key).collect();
        assert_eq!(keys, vec![20250601, 20250701]);
        assert!(schema.facts.inventory.iter().all(|r| r.date_key == 20250601));

        // Every fact date key resolves against the date dimension.
        for row in &schema.facts.inventory {
            assert!(
                schema
                    .dimensions
                    .dates
                    .iter()
                    .any(|d| d.date_key == row.date_key),
                "inventory date key {} has no dimension row",
                row.date_key
            );
        }

        let full = schema
            .dimensions
            .dates
            .iter()
            .find(|d| d.date_key == 20250601)
            .unwrap();
        assert_eq!(full.full_date, date(2025, 6, 1));
        assert_eq!(full.quarter, 2);
    }

    #[test]
    fn test_explicit_snapshot_date_inside_sales_window_adds_no_row() {
        let schema = transform(
            &reference_dataset(),
            SnapshotDatePolicy::Explicit(date(2025, 7, 1)),
        )
        .unwrap();

        assert_eq!(schema.dimensions.dates.len(), 1);
        assert_eq!(schema.dimensions.dates[0].date_key, 20250701);
        assert!(schema.facts.inventory.iter().all(|r| r.date_key == 20250701));
    }
}
