//! Warehouse table definitions
//!
//! Five tables: three dimensions, two facts. Surrogate keys are SERIAL
//! columns the warehouse assigns on insert; the loader depends on them
//! restarting at 1 after every `TRUNCATE ... RESTART IDENTITY`. The date
//! dimension is keyed by the computed YYYYMMDD integer instead, so no
//! sequence is involved there. Unique business-key constraints on the
//! product and branch dimensions are what catch duplicate source rows.

use sqlx::PgPool;

use crate::error::Result;

const DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS dim_product (
        product_key  SERIAL PRIMARY KEY,
        product_id   INTEGER NOT NULL UNIQUE,
        product_name TEXT NOT NULL,
        category     TEXT NOT NULL,
        price        NUMERIC(12, 2) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dim_branch (
        branch_key  SERIAL PRIMARY KEY,
        branch_id   INTEGER NOT NULL UNIQUE,
        branch_name TEXT NOT NULL,
        location    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dim_date (
        date_key    INTEGER PRIMARY KEY,
        full_date   DATE NOT NULL,
        year        INTEGER NOT NULL,
        quarter     SMALLINT NOT NULL,
        month       SMALLINT NOT NULL,
        day         SMALLINT NOT NULL,
        day_of_week SMALLINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fact_sales (
        date_key      INTEGER NOT NULL REFERENCES dim_date (date_key),
        product_key   INTEGER NOT NULL REFERENCES dim_product (product_key),
        branch_key    INTEGER NOT NULL REFERENCES dim_branch (branch_key),
        quantity_sold INTEGER NOT NULL,
        sale_amount   NUMERIC(14, 2) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fact_inventory (
        date_key      INTEGER NOT NULL REFERENCES dim_date (date_key),
        product_key   INTEGER NOT NULL REFERENCES dim_product (product_key),
        branch_key    INTEGER NOT NULL REFERENCES dim_branch (branch_key),
        stock_on_hand INTEGER NOT NULL
    )
    "#,
];

/// Create the five warehouse tables if they do not exist yet. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in DDL {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
