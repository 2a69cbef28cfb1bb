//! Local store adapter
//!
//! Durable key → string persistence over the SQLite kv table. Writes are
//! unconditional overwrites with no transactionality across keys: a crash
//! between two `set` calls can leave collections inconsistent relative to
//! each other. That risk is documented, not mitigated.

use crate::error::Result;
use crate::storage::Database;

/// Local storage key for the cloud mirror configuration object.
pub const CLOUD_SQL_CONFIG_KEY: &str = "SIMPLEDATA_cloud_sql_config_v1";

/// Key → string store backed by the local SQLite database.
#[derive(Debug, Clone)]
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Read a previously stored raw value, or `None` if the key was never
    /// written.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.map(|(value,)| value))
    }

    /// Unconditionally overwrite the value under `key`.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO kv (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> LocalStore {
        LocalStore::new(Database::in_memory().await.expect("in-memory db"))
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let store = store().await;
        assert_eq!(store.get("never_written").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = store().await;
        store.set("k", "first").await.unwrap();
        store.set("k", "second").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let store = store().await;
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }
}
