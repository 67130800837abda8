//! Raw record types and the record-source seam
//!
//! These are the flat inputs of one pipeline run, immutable once extracted.
//! The core does not care where they come from (files, API, queue); anything
//! implementing [`RecordSource`] can feed the pipeline.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EtlError, Result};

/// One point-of-sale line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub transaction_id: String,
    pub product_id: i32,
    pub branch_id: i32,
    pub quantity_sold: i32,
    pub transaction_time: NaiveDateTime,
}

/// Product catalog entry. `product_id` is the business key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: i32,
    pub product_name: String,
    pub category: String,
    /// Unit price. Parsed from the exact decimal text, never through a float.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// Branch directory entry. `branch_id` is the business key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub branch_id: i32,
    pub branch_name: String,
    pub location: String,
}

/// One stock level from the periodic inventory snapshot, taken at a single
/// point in time for every (branch, product) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub branch_id: i32,
    pub product_id: i32,
    pub stock_on_hand: i32,
}

/// All raw record sets for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub sales: Vec<SaleRecord>,
    pub products: Vec<Product>,
    pub branches: Vec<Branch>,
    pub inventory: Vec<InventoryRecord>,
}

impl RawDataset {
    /// Reject any empty record set before transformation starts.
    ///
    /// An empty set is a fatal extraction fault, not an empty-but-valid load:
    /// letting it through would truncate the warehouse without repopulating it.
    pub fn validate(&self) -> Result<()> {
        if self.sales.is_empty() {
            return Err(EtlError::EmptyDataset { entity: "sales" });
        }
        if self.products.is_empty() {
            return Err(EtlError::EmptyDataset { entity: "products" });
        }
        if self.branches.is_empty() {
            return Err(EtlError::EmptyDataset { entity: "branches" });
        }
        if self.inventory.is_empty() {
            return Err(EtlError::EmptyDataset { entity: "inventory" });
        }
        Ok(())
    }
}

/// Source of the four raw record sets consumed by the pipeline.
pub trait RecordSource {
    fn fetch(&self) -> Result<RawDataset>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixture builders for the transform unit tests.

    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    pub fn sale(txn: &str, product: i32, branch: i32, qty: i32, time: &str) -> SaleRecord {
        SaleRecord {
            transaction_id: txn.to_string(),
            product_id: product,
            branch_id: branch,
            quantity_sold: qty,
            transaction_time: time.parse().expect("fixture timestamp"),
        }
    }

    pub fn product(id: i32, name: &str, category: &str, price: &str) -> Product {
        Product {
            product_id: id,
            product_name: name.to_string(),
            category: category.to_string(),
            price: price.parse::<Decimal>().expect("fixture price"),
        }
    }

    pub fn branch(id: i32, name: &str, location: &str) -> Branch {
        Branch {
            branch_id: id,
            branch_name: name.to_string(),
            location: location.to_string(),
        }
    }

    pub fn stock(branch: i32, product: i32, on_hand: i32) -> InventoryRecord {
        InventoryRecord {
            branch_id: branch,
            product_id: product,
            stock_on_hand: on_hand,
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("fixture date")
    }

    /// The reference scenario: two products, one branch, three sales on
    /// 2025-07-01, two snapshot rows.
    pub fn reference_dataset() -> RawDataset {
        RawDataset {
            sales: vec![
                sale("T-001", 1, 1, 2, "2025-07-01T09:15:00"),
                sale("T-002", 2, 1, 1, "2025-07-01T12:30:00"),
                sale("T-003", 1, 1, 3, "2025-07-01T17:45:00"),
            ],
            products: vec![
                product(1, "Widget", "Homeware", "10.00"),
                product(2, "Gadget", "Electronics", "20.00"),
            ],
            branches: vec![branch(1, "Branch Cape Town", "Western Cape")],
            inventory: vec![stock(1, 1, 50), stock(1, 2, 5)],
        }
    }
}
