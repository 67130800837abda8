//! CSV extraction
//!
//! Reads the four raw record sets from a flat data directory:
//! every `sales_YYYYMMDD.csv` file (concatenated), plus `products.csv`,
//! `branches.csv`, and `inventory_snapshot.csv`. Column names in the files
//! must match the record field names; anything missing or mistyped surfaces
//! as a [`EtlError::SchemaMismatch`] before transformation starts.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{EtlError, Result};
use crate::records::{Branch, InventoryRecord, Product, RawDataset, RecordSource, SaleRecord};

/// File-based record source over a directory of raw CSV exports.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    data_dir: PathBuf,
}

impl CsvRecordSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn read_csv<T: DeserializeOwned>(path: &Path, entity: &'static str) -> Result<Vec<T>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            let row: T = result.map_err(|e| EtlError::SchemaMismatch {
                entity,
                detail: e.to_string(),
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// All daily sales exports, concatenated in filename order so repeated
    /// extractions see the rows in the same order.
    fn read_sales(&self) -> Result<Vec<SaleRecord>> {
        let pattern = self.data_dir.join("sales_*.csv");
        let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| EtlError::Io(e.into_error()))?;
        paths.sort();

        if paths.is_empty() {
            return Err(EtlError::EmptyDataset { entity: "sales" });
        }

        let mut sales = Vec::new();
        for path in &paths {
            sales.extend(Self::read_csv::<SaleRecord>(path, "sales")?);
        }
        info!(files = paths.len(), rows = sales.len(), "extracted sales records");
        Ok(sales)
    }
}

impl RecordSource for CsvRecordSource {
    fn fetch(&self) -> Result<RawDataset> {
        let sales = self.read_sales()?;
        let products = Self::read_csv(&self.data_dir.join("products.csv"), "products")?;
        let branches = Self::read_csv(&self.data_dir.join("branches.csv"), "branches")?;
        let inventory = Self::read_csv(
            &self.data_dir.join("inventory_snapshot.csv"),
            "inventory",
        )?;
        info!("extracted products, branches and inventory snapshot");

        Ok(RawDataset {
            sales,
            products,
            branches,
            inventory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("sales_20250701.csv"),
            "transaction_id,product_id,branch_id,quantity_sold,transaction_time\n\
             T-001,1,1,2,2025-07-01T09:15:00\n\
             T-002,2,1,1,2025-07-01T12:30:00\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("sales_20250702.csv"),
            "transaction_id,product_id,branch_id,quantity_sold,transaction_time\n\
             T-003,1,1,3,2025-07-02T17:45:00\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("products.csv"),
            "product_id,product_name,category,price\n\
             1,Widget,Homeware,10.00\n\
             2,Gadget,Electronics,20.00\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("branches.csv"),
            "branch_id,branch_name,location\n1,Branch Cape Town,Western Cape\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("inventory_snapshot.csv"),
            "branch_id,product_id,stock_on_hand\n1,1,50\n1,2,5\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_fetch_concatenates_sales_files() {
        let dir = write_fixture_dir();
        let raw = CsvRecordSource::new(dir.path()).fetch().unwrap();

        assert_eq!(raw.sales.len(), 3);
        assert_eq!(raw.sales[0].transaction_id, "T-001");
        assert_eq!(raw.sales[2].transaction_id, "T-003");
        assert_eq!(raw.products.len(), 2);
        assert_eq!(raw.branches.len(), 1);
        assert_eq!(raw.inventory.len(), 2);
        assert_eq!(raw.products[1].price.to_string(), "20.00");
    }

    #[test]
    fn test_missing_sales_files_is_empty_dataset() {
        let dir = write_fixture_dir();
        fs::remove_file(dir.path().join("sales_20250701.csv")).unwrap();
        fs::remove_file(dir.path().join("sales_20250702.csv")).unwrap();

        match CsvRecordSource::new(dir.path()).fetch() {
            Err(EtlError::EmptyDataset { entity }) => assert_eq!(entity, "sales"),
            other => panic!("expected EmptyDataset, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let dir = write_fixture_dir();
        fs::write(
            dir.path().join("products.csv"),
            "product_id,product_name,category\n1,Widget,Homeware\n",
        )
        .unwrap();

        match CsvRecordSource::new(dir.path()).fetch() {
            Err(EtlError::SchemaMismatch { entity, .. }) => assert_eq!(entity, "products"),
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_mistyped_value_is_schema_mismatch() {
        let dir = write_fixture_dir();
        fs::write(
            dir.path().join("sales_20250701.csv"),
            "transaction_id,product_id,branch_id,quantity_sold,transaction_time\n\
             T-001,not-a-number,1,2,2025-07-01T09:15:00\n",
        )
        .unwrap();

        match CsvRecordSource::new(dir.path()).fetch() {
            Err(EtlError::SchemaMismatch { entity, .. }) => assert_eq!(entity, "sales"),
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }
}
