//! Whole-blob key-value storage.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::core::host::BlobStore;

/// Key-value database operations.
pub struct KvDb;

impl KvDb {
    /// Fetch the blob stored under `key`.
    pub async fn get(db: &SqlitePool, key: &str) -> Result<Option<Vec<u8>>, sqlx::Error> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

        if let Some(row) = row {
            Ok(Some(row.try_get("value")?))
        } else {
            Ok(None)
        }
    }

    /// Store `value` under `key`, replacing any previous blob.
    pub async fn set(db: &SqlitePool, key: &str, value: &[u8]) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO kv_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(db)
        .await?;

        tracing::debug!("Saved {} byte blob under key: {}", value.len(), key);
        Ok(())
    }
}

/// [`BlobStore`] backed by a SQLite pool, for hosts that have no
/// persistence layer of their own.
#[derive(Clone)]
pub struct SqliteBlobStore {
    pool: SqlitePool,
}

impl SqliteBlobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for SqliteBlobStore {
    async fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(KvDb::get(&self.pool, key).await?)
    }

    async fn set_blob(&self, key: &str, value: Vec<u8>) -> Result<()> {
        Ok(KvDb::set(&self.pool, key, &value).await?)
    }
}
