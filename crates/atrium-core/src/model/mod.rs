//! Data model
//!
//! Collections hold schemaless [`Record`]s: ordered maps from field name to
//! JSON value, keyed by a string `id` unique within the collection. The typed
//! structs below cover the fields the rest of the system depends on (seed
//! data, merge policy, auth, the CLI); everything round-trips through serde so
//! ad-hoc columns added at runtime survive untouched on records the typed
//! layer never sees.
//!
//! Serde renames match the persisted JSON shapes exactly, so data written by
//! earlier deployments loads unchanged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A schemaless record: an ordered field-name → value map.
pub type Record = serde_json::Map<String, Value>;

/// The five persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Projects,
    Gems,
    Tools,
    UsedIds,
}

impl Table {
    /// All tables, in persistence order.
    pub const ALL: [Table; 5] = [
        Table::Users,
        Table::Projects,
        Table::Gems,
        Table::Tools,
        Table::UsedIds,
    ];

    /// Local storage key for this collection.
    ///
    /// Key names are kept verbatim from earlier deployments so existing
    /// persisted data loads without migration.
    pub fn local_key(&self) -> &'static str {
        match self {
            Table::Users => "SIMPLEDATA_users_v1",
            Table::Projects => "SIMPLEDATA_projects_v1",
            Table::Gems => "SIMPLEDATA_gems_v1",
            Table::Tools => "SIMPLEDATA_tools_v1",
            Table::UsedIds => "SIMPLEDATA_used_ids_v1",
        }
    }

    /// Remote mirror table name (document table keyed by id).
    pub fn remote_table(&self) -> &'static str {
        match self {
            Table::Users => "app_users",
            Table::Projects => "app_projects",
            Table::Gems => "app_gems",
            Table::Tools => "app_tools",
            Table::UsedIds => "app_used_ids",
        }
    }

    /// Parse a user-facing table name (case-insensitive).
    pub fn parse(name: &str) -> Result<Table> {
        match name.to_ascii_lowercase().as_str() {
            "users" => Ok(Table::Users),
            "projects" => Ok(Table::Projects),
            "gems" => Ok(Table::Gems),
            "tools" => Ok(Table::Tools),
            "used_ids" | "usedids" => Ok(Table::UsedIds),
            other => Err(Error::InvalidInput(format!("Unknown table: {}", other))),
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Table::Users => "users",
            Table::Projects => "projects",
            Table::Gems => "gems",
            Table::Tools => "tools",
            Table::UsedIds => "used_ids",
        };
        f.write_str(name)
    }
}

/// Read the `id` field of a record, if present and a string.
pub fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Convert a typed value into a schemaless record.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidInput(format!(
            "Expected a JSON object, got {}",
            other
        ))),
    }
}

/// Convert a schemaless record back into a typed value.
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// User role; drives authorization checks in consumers, not in this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    #[serde(rename = "CEO")]
    Ceo,
    #[serde(rename = "Project Manager")]
    ProjectManager,
    #[serde(rename = "Developer")]
    Developer,
    #[serde(rename = "Designer")]
    Designer,
    #[serde(rename = "Analyst")]
    Analyst,
}

/// A named skill with a 0-100 proficiency level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub email: String,
    /// Plaintext by design; empty string means "no password required".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub avatar: String,
    pub skills: Vec<Skill>,
    /// Project ids this user is assigned to.
    pub projects: Vec<String>,
}

/// Project lifecycle status. `EnCurso` is a deprecated legacy value kept so
/// old persisted data still deserializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "Planificación")]
    Planificacion,
    #[serde(rename = "En Desarrollo")]
    EnDesarrollo,
    #[serde(rename = "En QA")]
    EnQa,
    #[serde(rename = "Despliegue")]
    Despliegue,
    #[serde(rename = "Finalizado")]
    Finalizado,
    #[serde(rename = "En Curso")]
    EnCurso,
}

/// Append-only project journal entry; displayed reverse-chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLog {
    pub id: String,
    pub date: String,
    pub text: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoKind {
    Github,
    Drive,
    Other,
}

/// A linked repository or folder owned by exactly one project. The list is
/// not deduplicated by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub alias: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: RepoKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub client: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encargado_cliente: Option<String>,
    pub lead_id: String,
    pub team_ids: Vec<String>,
    pub status: ProjectStatus,
    pub is_ongoing: bool,
    pub report: bool,
    pub deadline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    pub progress: u8,
    pub description: String,
    pub technologies: Vec<String>,
    pub year: i32,
    pub logs: Vec<ProjectLog>,
    pub repositories: Vec<Repository>,
}

/// Ledger entry for a project id ever issued. Append-only; never mutated or
/// deleted by normal operation, so issued correlatives are never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedId {
    pub id: String,
    /// Project name snapshot at issue time.
    pub name: String,
    pub date_used: String,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon: String,
    pub color: String,
    /// True when `url` is a local-machine path rather than a web URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_local: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_parse_roundtrip() {
        for table in Table::ALL {
            assert_eq!(Table::parse(&table.to_string()).unwrap(), table);
        }
        assert!(Table::parse("invoices").is_err());
    }

    #[test]
    fn test_user_serde_shape() {
        let user = User {
            id: "u_test".to_string(),
            name: "Test".to_string(),
            role: UserRole::ProjectManager,
            email: "test@example.com".to_string(),
            password: Some(String::new()),
            avatar: String::new(),
            skills: vec![Skill {
                name: "Scrum".to_string(),
                level: 90,
            }],
            projects: vec!["PROYECTO_001".to_string()],
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "Project Manager");
        assert_eq!(json["skills"][0]["level"], 90);

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_legacy_status_still_deserializes() {
        let status: ProjectStatus = serde_json::from_str("\"En Curso\"").unwrap();
        assert_eq!(status, ProjectStatus::EnCurso);
    }

    #[test]
    fn test_record_preserves_unknown_fields() {
        let raw = r#"{"id": "t9", "name": "X", "url": "u", "icon": "i", "color": "c", "customField": 42}"#;
        let record: Record = serde_json::from_str(raw).unwrap();
        assert_eq!(record_id(&record), Some("t9"));
        assert_eq!(record.get("customField"), Some(&Value::from(42)));

        // Field order survives serialization
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys.first().map(|k| k.as_str()), Some("id"));
        assert_eq!(keys.last().map(|k| k.as_str()), Some("customField"));
    }

    #[test]
    fn test_repository_kind_rename() {
        let repo = Repository {
            id: "r1".to_string(),
            alias: "Docs".to_string(),
            url: "https://drive.google.com/x".to_string(),
            kind: RepoKind::Drive,
        };
        let json = serde_json::to_value(&repo).unwrap();
        assert_eq!(json["type"], "drive");
    }
}
