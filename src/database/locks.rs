//! Postgres advisory-lock helpers
//!
//! Transaction-scoped advisory locks guard the full-refresh load against a
//! concurrent run interleaving its truncate/insert phases. Acquisition is
//! fail-fast (`pg_try_advisory_xact_lock`): on contention the caller aborts
//! instead of queueing behind another load.

use sha2::{Digest, Sha256};
use sqlx::{Postgres, Transaction};

use crate::error::Result;

/// Derive a stable 64-bit advisory lock key from a namespace string.
///
/// Same input always produces the same key, across processes and releases.
pub fn lock_key(namespace: &str) -> i64 {
    let digest = Sha256::digest(namespace.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    i64::from_be_bytes(bytes)
}

/// Block until the lock is acquired. Released on commit or rollback.
pub async fn advisory_xact_lock(tx: &mut Transaction<'_, Postgres>, key: i64) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Try to acquire the lock without blocking. Returns `false` on contention.
pub async fn try_advisory_xact_lock(
    tx: &mut Transaction<'_, Postgres>,
    key: i64,
) -> Result<bool> {
    let acquired: bool = sqlx::query_scalar("SELECT pg_try_advisory_xact_lock($1)")
        .bind(key)
        .fetch_one(&mut **tx)
        .await?;
    Ok(acquired)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_key_is_stable() {
        let key1 = lock_key("retail_etl.full_refresh");
        let key2 = lock_key("retail_etl.full_refresh");
        assert_eq!(key1, key2);
    }

    #[test]
    fn test_lock_key_separates_namespaces() {
        assert_ne!(lock_key("retail_etl.full_refresh"), lock_key("other"));
    }
}
