//! End-to-end pipeline orchestration
//!
//! Thin sequential driver: extract, validate, transform, load. All design
//! weight lives in the stages; this module only orders them and reports
//! progress.

use tracing::info;

use crate::database::{LoadReport, WarehouseLoader};
use crate::error::Result;
use crate::records::RecordSource;
use crate::transform::{transform, SnapshotDatePolicy};

pub struct EtlPipeline<S: RecordSource> {
    source: S,
    loader: WarehouseLoader,
    snapshot_date: SnapshotDatePolicy,
}

impl<S: RecordSource> EtlPipeline<S> {
    pub fn new(source: S, loader: WarehouseLoader) -> Self {
        Self {
            source,
            loader,
            snapshot_date: SnapshotDatePolicy::default(),
        }
    }

    pub fn with_snapshot_date(mut self, policy: SnapshotDatePolicy) -> Self {
        self.snapshot_date = policy;
        self
    }

    /// Run one full refresh: extract, validate, transform, load.
    pub async fn run(&self) -> Result<LoadReport> {
        info!("ETL pipeline started");

        let raw = self.source.fetch()?;
        raw.validate()?;
        info!(
            sales = raw.sales.len(),
            products = raw.products.len(),
            branches = raw.branches.len(),
            inventory = raw.inventory.len(),
            "extraction complete"
        );

        let schema = transform(&raw, self.snapshot_date)?;
        info!(
            dates = schema.dimensions.dates.len(),
            sale_facts = schema.facts.sales.len(),
            inventory_facts = schema.facts.inventory.len(),
            "transformation complete"
        );

        let report = self.loader.load(&schema).await?;
        info!("ETL pipeline finished");
        Ok(report)
    }
}
