//! Record store façade
//!
//! One `Store` is constructed at process start and passed to consumers; there
//! is no ambient global. All collections live in memory for the process
//! lifetime. Every mutation applies locally first (memory, then a full
//! re-serialization of the touched collection into the local store) and only
//! then mirrors to the cloud bridge, best-effort: a mirror failure is logged
//! and reported as [`MirrorStatus::Failed`], never as an error on the local
//! path. Only the explicit cloud actions (test connection, initialize schema,
//! migrate) propagate mirror errors.
//!
//! Last write wins everywhere; `update`/`delete` of an unknown id is a silent
//! no-op by design, and callers that need confirmation must check existence
//! first.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::merge;
use crate::mirror::{CloudSqlConfig, RemoteMirror};
use crate::model::{from_record, record_id, to_record, Gem, Project, Record, Table, Tool, UsedId, User};
use crate::seed;
use crate::storage::{LocalStore, CLOUD_SQL_CONFIG_KEY};

/// Outcome of the best-effort mirror leg of a mutation. The local mutation
/// has already succeeded whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorStatus {
    /// Mirror inactive, or nothing to sync.
    Skipped,
    /// Remote accepted the write.
    Synced,
    /// Remote failed; local state is authoritative.
    Failed(String),
}

/// Schema mutation over a schemaless collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterAction {
    /// Insert the field with a default value on every record lacking it.
    AddColumn,
    /// Remove the field from every record.
    DropColumn,
}

#[derive(Debug, Default)]
struct Collections {
    users: Vec<Record>,
    projects: Vec<Record>,
    gems: Vec<Record>,
    tools: Vec<Record>,
    used_ids: Vec<Record>,
    cloud: CloudSqlConfig,
}

impl Collections {
    fn get(&self, table: Table) -> &Vec<Record> {
        match table {
            Table::Users => &self.users,
            Table::Projects => &self.projects,
            Table::Gems => &self.gems,
            Table::Tools => &self.tools,
            Table::UsedIds => &self.used_ids,
        }
    }

    fn get_mut(&mut self, table: Table) -> &mut Vec<Record> {
        match table {
            Table::Users => &mut self.users,
            Table::Projects => &mut self.projects,
            Table::Gems => &mut self.gems,
            Table::Tools => &mut self.tools,
            Table::UsedIds => &mut self.used_ids,
        }
    }
}

/// The portal's record store: local-first, optionally cloud-mirrored.
pub struct Store {
    local: LocalStore,
    mirror: Arc<dyn RemoteMirror>,
    state: RwLock<Collections>,
}

impl Store {
    /// Open the store: read persisted collections, reconcile them with the
    /// seed dataset (see [`crate::merge`]), and persist the reconciled state
    /// back so later loads skip the merge work.
    pub async fn open(local: LocalStore, mirror: Arc<dyn RemoteMirror>) -> Result<Self> {
        let cloud = match local.get(CLOUD_SQL_CONFIG_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => CloudSqlConfig::default(),
        };

        let persisted_users = read_collection(&local, Table::Users).await?;
        let persisted_projects = read_collection(&local, Table::Projects).await?;
        let persisted_gems = read_collection(&local, Table::Gems).await?;
        let persisted_tools = read_collection(&local, Table::Tools).await?;
        let persisted_used_ids = read_collection(&local, Table::UsedIds).await?;

        let users = merge::merge_users(persisted_users, seed_records(&seed::seed_users())?);
        let projects =
            merge::merge_projects(persisted_projects, seed_records(&seed::seed_projects())?);
        let gems = if persisted_gems.is_empty() {
            seed_records(&seed::seed_gems())?
        } else {
            persisted_gems
        };
        let tools = if persisted_tools.is_empty() {
            seed_records(&seed::seed_tools())?
        } else {
            persisted_tools
        };
        let used_ids = if persisted_used_ids.is_empty() {
            let now = chrono::Utc::now().to_rfc3339();
            merge::bootstrap_used_ids(&projects, &now)
        } else {
            persisted_used_ids
        };

        let store = Self {
            local,
            mirror,
            state: RwLock::new(Collections {
                users,
                projects,
                gems,
                tools,
                used_ids,
                cloud,
            }),
        };

        // Persist the reconciled state immediately so the merge does not need
        // to repeat against seed data on the next load.
        {
            let state = store.state.read().await;
            for table in Table::ALL {
                store.persist(table, state.get(table)).await?;
            }
        }

        info!("Record store loaded");
        Ok(store)
    }

    /// Snapshot copy of a full collection. Never fails.
    pub async fn list(&self, table: Table) -> Vec<Record> {
        self.state.read().await.get(table).clone()
    }

    /// Append a record. The store performs no uniqueness validation; callers
    /// own identifier collision checks.
    pub async fn add(&self, table: Table, record: Record) -> Result<MirrorStatus> {
        let cloud = {
            let mut state = self.state.write().await;
            state.get_mut(table).push(record.clone());
            self.persist(table, state.get(table)).await?;
            state.cloud.clone()
        };
        Ok(self.mirror_upsert(&cloud, table, &record).await)
    }

    /// Full-record replace by identifier. Silent no-op when the id is absent.
    pub async fn update(&self, table: Table, record: Record) -> Result<MirrorStatus> {
        let cloud = {
            let mut state = self.state.write().await;
            let records = state.get_mut(table);
            let Some(index) = position_of(records, record_id(&record)) else {
                return Ok(MirrorStatus::Skipped);
            };
            records[index] = record.clone();
            self.persist(table, state.get(table)).await?;
            state.cloud.clone()
        };
        Ok(self.mirror_upsert(&cloud, table, &record).await)
    }

    /// Remove by identifier. Silent no-op when the id is absent; idempotent.
    pub async fn delete(&self, table: Table, id: &str) -> Result<MirrorStatus> {
        let cloud = {
            let mut state = self.state.write().await;
            let records = state.get_mut(table);
            let Some(index) = position_of(records, Some(id)) else {
                return Ok(MirrorStatus::Skipped);
            };
            records.remove(index);
            self.persist(table, state.get(table)).await?;
            state.cloud.clone()
        };

        if !cloud.is_enabled() {
            return Ok(MirrorStatus::Skipped);
        }
        match self.mirror.remove(&cloud, table, id).await {
            Ok(()) => Ok(MirrorStatus::Synced),
            Err(e) => {
                warn!(table = %table, id, error = %e, "Cloud delete failed; local state is authoritative");
                Ok(MirrorStatus::Failed(e.to_string()))
            }
        }
    }

    /// Append-only insert into the used-id ledger, idempotent by identifier.
    pub async fn register_used_id(&self, entry: UsedId) -> Result<MirrorStatus> {
        {
            let state = self.state.read().await;
            if position_of(&state.used_ids, Some(entry.id.as_str())).is_some() {
                return Ok(MirrorStatus::Skipped);
            }
        }
        self.add(Table::UsedIds, to_record(&entry)?).await
    }

    /// Document-store "ALTER TABLE": bulk-map every record in the collection,
    /// inserting or removing one field. Schema-on-read; no types, no
    /// constraints.
    pub async fn alter_table(
        &self,
        table: Table,
        action: AlterAction,
        field: &str,
        default: Option<Value>,
    ) -> Result<MirrorStatus> {
        if field.is_empty() {
            return Err(Error::InvalidInput("Field name must not be empty".to_string()));
        }
        let updated = {
            let state = self.state.read().await;
            let mut records = state.get(table).clone();
            for record in &mut records {
                match action {
                    AlterAction::AddColumn => {
                        if !record.contains_key(field) {
                            record.insert(
                                field.to_string(),
                                default.clone().unwrap_or_else(|| Value::String(String::new())),
                            );
                        }
                    }
                    AlterAction::DropColumn => {
                        record.remove(field);
                    }
                }
            }
            records
        };
        self.bulk_replace(table, updated).await
    }

    /// Replace an entire collection, then persist. Used by ETL import and by
    /// [`Store::alter_table`]. The mirror leg re-pushes the full collection.
    pub async fn bulk_replace(&self, table: Table, records: Vec<Record>) -> Result<MirrorStatus> {
        let cloud = {
            let mut state = self.state.write().await;
            *state.get_mut(table) = records.clone();
            self.persist(table, state.get(table)).await?;
            state.cloud.clone()
        };

        if !cloud.is_enabled() {
            return Ok(MirrorStatus::Skipped);
        }
        match self.mirror.push_all(&cloud, table, &records).await {
            Ok(_) => Ok(MirrorStatus::Synced),
            Err(e) => {
                warn!(table = %table, error = %e, "Cloud bulk sync failed; local state is authoritative");
                Ok(MirrorStatus::Failed(e.to_string()))
            }
        }
    }

    /// Restore the seed dataset locally. The used-id ledger is kept: issued
    /// correlatives are never reused. Cloud data is left untouched; run a
    /// migration to overwrite it.
    pub async fn reset_to_defaults(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.users = seed_records(&seed::seed_users())?;
        state.projects = seed_records(&seed::seed_projects())?;
        state.gems = seed_records(&seed::seed_gems())?;
        state.tools = seed_records(&seed::seed_tools())?;
        for table in [Table::Users, Table::Projects, Table::Gems, Table::Tools] {
            self.persist(table, state.get(table)).await?;
        }
        if state.cloud.is_enabled() {
            warn!("Local data reset; run a migration to overwrite cloud data");
        }
        Ok(())
    }

    /// Next correlative project id: max numeric suffix seen in the used-id
    /// ledger (falling back to live projects when the ledger is empty) + 1.
    pub async fn next_project_id(&self) -> String {
        let state = self.state.read().await;
        let mut numbers: Vec<u32> = state.used_ids.iter().filter_map(numeric_suffix).collect();
        if numbers.is_empty() {
            numbers = state.projects.iter().filter_map(numeric_suffix).collect();
        }
        let max = numbers.into_iter().max().unwrap_or(0);
        format!("PROYECTO_{:03}", max + 1)
    }

    /// Current cloud bridge configuration.
    pub async fn cloud_config(&self) -> CloudSqlConfig {
        self.state.read().await.cloud.clone()
    }

    /// Replace and persist the cloud bridge configuration.
    pub async fn save_cloud_config(&self, config: CloudSqlConfig) -> Result<()> {
        let mut state = self.state.write().await;
        let raw = serde_json::to_string(&config)?;
        self.local.set(CLOUD_SQL_CONFIG_KEY, &raw).await?;
        state.cloud = config;
        Ok(())
    }

    /// Explicit cloud action: round-trip a trivial query through the proxy.
    pub async fn test_connection(&self) -> Result<()> {
        let cloud = self.cloud_config().await;
        self.mirror.execute(&cloud, "SELECT 1", &[]).await?;
        Ok(())
    }

    /// Explicit cloud action: create the remote document tables. No-op while
    /// the bridge is inactive.
    pub async fn initialize_cloud_schema(&self) -> Result<()> {
        let cloud = self.cloud_config().await;
        if !cloud.is_active {
            return Ok(());
        }
        self.mirror.initialize_schema(&cloud).await
    }

    /// Explicit cloud action: push every record of every collection with
    /// upsert semantics. Full overwrite, no rollback on partial failure.
    /// Returns the number of records pushed.
    pub async fn migrate_to_cloud(&self) -> Result<usize> {
        let cloud = self.cloud_config().await;
        if !cloud.is_active {
            return Err(Error::RemoteMirror("Cloud connection not active".to_string()));
        }

        let mut pushed = 0;
        for table in Table::ALL {
            let records = self.list(table).await;
            pushed += self.mirror.push_all(&cloud, table, &records).await?;
        }
        Ok(pushed)
    }

    /// Explicit cloud action: read a collection back from the remote mirror.
    pub async fn fetch_remote(&self, table: Table) -> Result<Vec<Record>> {
        let cloud = self.cloud_config().await;
        self.mirror.fetch_table(&cloud, table).await
    }

    // Typed conveniences over the schemaless collections.

    pub async fn users(&self) -> Result<Vec<User>> {
        typed(self.list(Table::Users).await)
    }

    pub async fn projects(&self) -> Result<Vec<Project>> {
        typed(self.list(Table::Projects).await)
    }

    pub async fn gems(&self) -> Result<Vec<Gem>> {
        typed(self.list(Table::Gems).await)
    }

    pub async fn tools(&self) -> Result<Vec<Tool>> {
        typed(self.list(Table::Tools).await)
    }

    pub async fn used_ids(&self) -> Result<Vec<UsedId>> {
        typed(self.list(Table::UsedIds).await)
    }

    async fn persist(&self, table: Table, records: &[Record]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.local.set(table.local_key(), &raw).await
    }

    async fn mirror_upsert(
        &self,
        cloud: &CloudSqlConfig,
        table: Table,
        record: &Record,
    ) -> MirrorStatus {
        if !cloud.is_enabled() {
            return MirrorStatus::Skipped;
        }
        match self.mirror.upsert(cloud, table, record).await {
            Ok(()) => MirrorStatus::Synced,
            Err(e) => {
                warn!(table = %table, error = %e, "Cloud sync failed; local state is authoritative");
                MirrorStatus::Failed(e.to_string())
            }
        }
    }
}

async fn read_collection(local: &LocalStore, table: Table) -> Result<Vec<Record>> {
    match local.get(table.local_key()).await? {
        Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
        _ => Ok(Vec::new()),
    }
}

fn seed_records<T: serde::Serialize>(values: &[T]) -> Result<Vec<Record>> {
    values.iter().map(to_record).collect()
}

fn typed<T: serde::de::DeserializeOwned>(records: Vec<Record>) -> Result<Vec<T>> {
    records.into_iter().map(from_record).collect()
}

fn position_of(records: &[Record], id: Option<&str>) -> Option<usize> {
    let id = id?;
    records.iter().position(|r| record_id(r) == Some(id))
}

/// Digits of a record's id, read as the correlative number ("PROYECTO_012"
/// → 12). Ids with no digits count as 0, matching historical behavior.
fn numeric_suffix(record: &Record) -> Option<u32> {
    let id = record_id(record)?;
    let digits: String = id.chars().filter(char::is_ascii_digit).collect();
    Some(digits.parse().unwrap_or(0))
}
