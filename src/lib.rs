//! Retail star-schema ETL
//!
//! Transforms flat point-of-sale records (sales line items, product catalog,
//! branch directory, inventory snapshot) into a dimensional model and bulk-loads
//! it into a PostgreSQL warehouse.
//!
//! The pipeline is strictly sequential: extract -> transform -> load.
//! Transformation is pure and in-memory; the [`database::WarehouseLoader`] is
//! the only stateful component and performs the whole load as one transaction,
//! so a run either fully replaces the warehouse contents or leaves them
//! untouched.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use retail_etl::extract::CsvRecordSource;
//! use retail_etl::database::WarehouseLoader;
//! use retail_etl::pipeline::EtlPipeline;
//!
//! # async fn run(pool: sqlx::PgPool) -> retail_etl::Result<()> {
//! let source = CsvRecordSource::new("data/raw");
//! let loader = WarehouseLoader::new(pool);
//! let report = EtlPipeline::new(source, loader).run().await?;
//! println!("loaded {} sale facts", report.fact_sales_rows);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Raw record types and the record-source seam
pub mod records;

// CSV extraction
pub mod extract;

// Warehouse connection configuration
pub mod config;

// Pure star-schema transforms
pub mod transform;

// Warehouse load (the only I/O component)
pub mod database;

// End-to-end orchestration
pub mod pipeline;

pub use error::{EtlError, Result};
