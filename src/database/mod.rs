//! Warehouse integration
//!
//! Everything that touches Postgres lives here: table DDL, advisory-lock
//! helpers, and the transactional full-refresh loader.

pub mod loader;
pub mod locks;
pub mod schema;

pub use loader::{
    DroppedFact, LoadOptions, LoadReport, UnresolvedKeyPolicy, WarehouseLoader,
};
pub use schema::ensure_schema;
