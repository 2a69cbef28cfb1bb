//! Remote mirror client ("cloud bridge")
//!
//! Optionally projects local collections onto a remote document table through
//! an opaque HTTP proxy. The proxy contract is fixed by existing deployments:
//!
//! - Request: `POST <proxyUrl>` with JSON body `{query, params, config}`.
//! - Success: `{data: [...]}`; document-table reads carry the record in each
//!   row's `content` field (object, or JSON-encoded string).
//! - Error: any non-2xx status; the body text is surfaced verbatim.
//!
//! The remote side is always one `(id PRIMARY KEY, content JSON)` table per
//! collection, never a normalized schema: local records are schemaless, and
//! the mirror preserves that by storing each one as an opaque JSON blob.
//! There is no batching and no transaction around multi-record pushes; a
//! failure partway leaves the remote table partially updated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{record_id, Record, Table};

/// Default request timeout for the HTTP proxy, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlProvider {
    Postgres,
    Mysql,
}

/// Connection settings for the cloud bridge. Persisted in the local store
/// under its own key; `is_active: false` means pure local mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudSqlConfig {
    pub connection_name: String,
    pub db_name: String,
    pub db_user: String,
    pub proxy_url: String,
    pub provider: SqlProvider,
    pub is_active: bool,
}

impl Default for CloudSqlConfig {
    fn default() -> Self {
        Self {
            connection_name: String::new(),
            db_name: String::new(),
            db_user: String::new(),
            proxy_url: String::new(),
            provider: SqlProvider::Postgres,
            is_active: false,
        }
    }
}

impl CloudSqlConfig {
    /// Whether mirror operations should run at all.
    pub fn is_enabled(&self) -> bool {
        self.is_active && !self.proxy_url.is_empty()
    }

    /// Column type for the JSON blob, per provider.
    fn content_type(&self) -> &'static str {
        match self.provider {
            SqlProvider::Postgres => "JSONB",
            SqlProvider::Mysql => "JSON",
        }
    }
}

/// The mirror port. One required method; the document-table operations are
/// built on it, so test doubles only fake `execute`.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    /// Send an opaque query with positional params to the proxy and return
    /// the response rows.
    async fn execute(
        &self,
        config: &CloudSqlConfig,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<Value>>;

    /// Upsert one record into the collection's document table.
    async fn upsert(&self, config: &CloudSqlConfig, table: Table, record: &Record) -> Result<()> {
        let id = record_id(record)
            .ok_or_else(|| Error::InvalidInput("Record is missing an id".to_string()))?;
        let content = serde_json::to_string(&Value::Object(record.clone()))?;
        let query = format!(
            "INSERT INTO {} (id, content) VALUES ($1, $2) ON CONFLICT (id) DO UPDATE SET content = $2",
            table.remote_table()
        );
        self.execute(config, &query, &[json!(id), json!(content)])
            .await?;
        Ok(())
    }

    /// Delete one record from the collection's document table.
    async fn remove(&self, config: &CloudSqlConfig, table: Table, id: &str) -> Result<()> {
        let query = format!("DELETE FROM {} WHERE id = $1", table.remote_table());
        self.execute(config, &query, &[json!(id)]).await?;
        Ok(())
    }

    /// Create the document table for every collection.
    async fn initialize_schema(&self, config: &CloudSqlConfig) -> Result<()> {
        for table in Table::ALL {
            let query = format!(
                "CREATE TABLE IF NOT EXISTS {} (id VARCHAR(255) PRIMARY KEY, content {});",
                table.remote_table(),
                config.content_type()
            );
            self.execute(config, &query, &[]).await?;
        }
        Ok(())
    }

    /// Push every given record with upsert semantics. Full-overwrite, not a
    /// delta sync; returns the number of records pushed.
    async fn push_all(
        &self,
        config: &CloudSqlConfig,
        table: Table,
        records: &[Record],
    ) -> Result<usize> {
        for record in records {
            self.upsert(config, table, record).await?;
        }
        Ok(records.len())
    }

    /// Read a whole collection back, unwrapping each row's `content` field
    /// (parsing it when the proxy returns it as a string).
    async fn fetch_table(&self, config: &CloudSqlConfig, table: Table) -> Result<Vec<Record>> {
        let query = format!("SELECT content FROM {}", table.remote_table());
        let rows = self.execute(config, &query, &[]).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let content = row
                .get("content")
                .cloned()
                .ok_or_else(|| Error::RemoteMirror("Row is missing 'content'".to_string()))?;
            let value = match content {
                Value::String(raw) => serde_json::from_str(&raw)
                    .map_err(|e| Error::RemoteMirror(format!("Malformed row content: {}", e)))?,
                other => other,
            };
            match value {
                Value::Object(map) => records.push(map),
                other => {
                    return Err(Error::RemoteMirror(format!(
                        "Expected an object row, got {}",
                        other
                    )))
                }
            }
        }
        Ok(records)
    }
}

/// Production mirror speaking the proxy HTTP contract.
#[derive(Debug, Clone)]
pub struct HttpMirror {
    http_client: reqwest::Client,
}

impl HttpMirror {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::Network)?;
        Ok(Self { http_client })
    }
}

impl Default for HttpMirror {
    fn default() -> Self {
        // Building a client with a static timeout cannot fail in practice.
        Self::new(DEFAULT_TIMEOUT_SECS).expect("default HTTP client")
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Vec<Value>,
}

#[async_trait]
impl RemoteMirror for HttpMirror {
    async fn execute(
        &self,
        config: &CloudSqlConfig,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<Value>> {
        if config.proxy_url.is_empty() {
            return Err(Error::RemoteMirror("No proxy URL configured".to_string()));
        }

        debug!(proxy = %config.proxy_url, "Executing cloud query");

        let response = self
            .http_client
            .post(&config.proxy_url)
            .json(&json!({
                "query": query,
                "params": params,
                "config": config,
            }))
            .send()
            .await
            .map_err(Error::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteMirror(body));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::RemoteMirror(format!("Malformed proxy response: {}", e)))?;
        Ok(parsed.data)
    }
}

/// In-memory mirror double: records every `(query, params)` pair and can be
/// switched to fail, for exercising the best-effort sync paths.
#[derive(Debug, Default)]
pub struct RecordingMirror {
    calls: std::sync::Mutex<Vec<(String, Vec<Value>)>>,
    fail_with: std::sync::Mutex<Option<String>>,
}

impl RecordingMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a `RemoteMirror` error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail_with.lock().expect("mirror lock") = Some(message.into());
    }

    /// Queries issued so far.
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().expect("mirror lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mirror lock").len()
    }
}

#[async_trait]
impl RemoteMirror for RecordingMirror {
    async fn execute(
        &self,
        _config: &CloudSqlConfig,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<Value>> {
        self.calls
            .lock()
            .expect("mirror lock")
            .push((query.to_string(), params.to_vec()));
        if let Some(message) = self.fail_with.lock().expect("mirror lock").clone() {
            return Err(Error::RemoteMirror(message));
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_config() -> CloudSqlConfig {
        CloudSqlConfig {
            connection_name: "proj:region:instance".to_string(),
            db_name: "portal".to_string(),
            db_user: "portal".to_string(),
            proxy_url: "https://example.com/sql".to_string(),
            provider: SqlProvider::Postgres,
            is_active: true,
        }
    }

    #[test]
    fn test_config_serde_shape() {
        let config = active_config();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["proxyUrl"], "https://example.com/sql");
        assert_eq!(json["provider"], "postgres");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_enabled_requires_active_and_url() {
        let mut config = active_config();
        assert!(config.is_enabled());
        config.is_active = false;
        assert!(!config.is_enabled());
        config.is_active = true;
        config.proxy_url.clear();
        assert!(!config.is_enabled());
    }

    #[tokio::test]
    async fn test_upsert_query_shape() {
        let mirror = RecordingMirror::new();
        let record: Record =
            serde_json::from_str(r#"{"id": "g1", "name": "COTIZACIONES"}"#).unwrap();

        mirror
            .upsert(&active_config(), Table::Gems, &record)
            .await
            .unwrap();

        let calls = mirror.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("INSERT INTO app_gems"));
        assert!(calls[0].0.contains("ON CONFLICT (id) DO UPDATE"));
        assert_eq!(calls[0].1[0], "g1");
        // Params carry the record as a JSON-encoded string blob
        let blob: Value = serde_json::from_str(calls[0].1[1].as_str().unwrap()).unwrap();
        assert_eq!(blob["name"], "COTIZACIONES");
    }

    #[tokio::test]
    async fn test_initialize_schema_per_provider() {
        let mirror = RecordingMirror::new();
        mirror.initialize_schema(&active_config()).await.unwrap();

        let calls = mirror.calls();
        assert_eq!(calls.len(), Table::ALL.len());
        assert!(calls[0].0.contains("content JSONB"));

        let mirror = RecordingMirror::new();
        let config = CloudSqlConfig {
            provider: SqlProvider::Mysql,
            ..active_config()
        };
        mirror.initialize_schema(&config).await.unwrap();
        assert!(mirror.calls()[0].0.contains("content JSON)"));
    }

    #[tokio::test]
    async fn test_upsert_requires_id() {
        let mirror = RecordingMirror::new();
        let record: Record = serde_json::from_str(r#"{"name": "no id"}"#).unwrap();
        let err = mirror
            .upsert(&active_config(), Table::Gems, &record)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(mirror.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_mirror_surfaces_message() {
        let mirror = RecordingMirror::new();
        mirror.fail_with("boom");
        let err = mirror
            .execute(&active_config(), "SELECT 1", &[])
            .await
            .unwrap_err();
        assert!(err.is_remote());
        assert!(err.to_string().contains("boom"));
    }
}
