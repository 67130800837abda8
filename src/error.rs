//! Error handling for the ETL pipeline
//!
//! One thiserror enum covers the whole pipeline. Extraction and transformation
//! errors are fatal and synchronous; load errors surface after the warehouse
//! transaction has been rolled back.

use thiserror::Error;

/// Main error type for the ETL pipeline
#[derive(Error, Debug)]
pub enum EtlError {
    /// A raw record set is missing a column or carries a value of the wrong
    /// type. Raised before any transformation begins.
    #[error("schema mismatch in {entity}: {detail}")]
    SchemaMismatch {
        entity: &'static str,
        detail: String,
    },

    /// A required record set extracted zero rows. Treated as fatal so an empty
    /// run can never truncate the warehouse without repopulating it.
    #[error("no rows extracted for {entity}")]
    EmptyDataset { entity: &'static str },

    /// A sale line references a product business key with no catalog entry,
    /// so no unit price exists to compute the sale amount.
    #[error("sale {transaction_id} references unknown product {product_id}")]
    UnknownProduct {
        transaction_id: String,
        product_id: i32,
    },

    /// Fact rows reference business keys absent from the just-loaded
    /// dimensions. Only raised under the strict resolution policy; the
    /// transaction is rolled back before this surfaces.
    #[error("{count} {table} rows reference dimension keys missing from the warehouse (first: {first})")]
    UnresolvedKeys {
        table: &'static str,
        count: usize,
        first: String,
    },

    /// Another full-refresh load holds the advisory lock on the target tables.
    #[error("another warehouse load is in progress for the target tables")]
    LoadInProgress,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, EtlError>;
