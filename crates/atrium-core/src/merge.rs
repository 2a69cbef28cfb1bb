//! Merge-on-load
//!
//! Reconciles persisted collections with the seed dataset once at startup.
//! The policy is deterministic (the original shipped several variants over
//! time; this one is the documented target):
//!
//! - a record present in both keeps its persisted fields, except
//! - list-valued membership fields are set-unioned (persisted order first,
//!   seed extras appended), and
//! - a small set of authoritative fields is always overwritten from seed
//!   (users: `role`, `name`; projects: `client`, `name`);
//! - seed-only records are appended, persisted-only records kept as-is.
//!
//! Projects additionally go through a legacy-shape migration: records from
//! old deployments that carried single-value `repoGithub` / `repoDrive` links
//! instead of a `repositories` list get the list synthesized and the legacy
//! fields dropped.
//!
//! Running the merge on its own output is a no-op.

use serde_json::{json, Value};

use crate::model::{record_id, Record};

/// Fields always taken from seed for users.
const USER_AUTHORITATIVE: &[&str] = &["role", "name"];
/// Membership lists unioned for users.
const USER_LIST_FIELDS: &[&str] = &["projects"];

/// Fields always taken from seed for projects.
const PROJECT_AUTHORITATIVE: &[&str] = &["client", "name"];
/// Membership lists unioned for projects.
const PROJECT_LIST_FIELDS: &[&str] = &["teamIds"];

/// Creator name stamped on ledger entries synthesized at bootstrap.
const BOOTSTRAP_CREATOR: &str = "system";

/// Merge persisted users against the seed set.
pub fn merge_users(persisted: Vec<Record>, seed: Vec<Record>) -> Vec<Record> {
    merge_by_id(persisted, seed, USER_LIST_FIELDS, USER_AUTHORITATIVE)
}

/// Merge persisted projects against the seed set, migrating legacy link
/// fields first.
pub fn merge_projects(mut persisted: Vec<Record>, seed: Vec<Record>) -> Vec<Record> {
    for record in &mut persisted {
        migrate_legacy_links(record);
    }
    merge_by_id(persisted, seed, PROJECT_LIST_FIELDS, PROJECT_AUTHORITATIVE)
}

/// The shared by-id merge: persisted wins, list fields union, authoritative
/// fields overwritten from seed, seed-only records appended.
fn merge_by_id(
    persisted: Vec<Record>,
    seed: Vec<Record>,
    list_fields: &[&str],
    authoritative: &[&str],
) -> Vec<Record> {
    let mut merged: Vec<Record> = Vec::with_capacity(persisted.len() + seed.len());

    for mut record in persisted {
        if let Some(seed_record) = find_by_id(&seed, record_id(&record)) {
            for field in authoritative {
                if let Some(value) = seed_record.get(*field) {
                    record.insert((*field).to_string(), value.clone());
                }
            }
            for field in list_fields {
                let unioned = union_lists(record.get(*field), seed_record.get(*field));
                record.insert((*field).to_string(), Value::Array(unioned));
            }
        }
        merged.push(record);
    }

    for seed_record in seed {
        if find_by_id(&merged, record_id(&seed_record)).is_none() {
            merged.push(seed_record);
        }
    }

    merged
}

fn find_by_id<'a>(records: &'a [Record], id: Option<&str>) -> Option<&'a Record> {
    let id = id?;
    records.iter().find(|r| record_id(r) == Some(id))
}

/// Set union of two JSON arrays, preserving first-seen order.
fn union_lists(first: Option<&Value>, second: Option<&Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for value in [first, second].into_iter().flatten() {
        if let Value::Array(items) = value {
            for item in items {
                if !out.contains(item) {
                    out.push(item.clone());
                }
            }
        }
    }
    out
}

/// Rewrite a legacy project shape in place: a record with no `repositories`
/// list but with old single-value link fields gets the list synthesized from
/// them. Legacy fields are dropped either way.
pub fn migrate_legacy_links(record: &mut Record) {
    let legacy_github = record
        .remove("repoGithub")
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|s| !s.is_empty());
    let legacy_drive = record
        .remove("repoDrive")
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|s| !s.is_empty());

    if record.contains_key("repositories") {
        return;
    }

    let mut repositories = Vec::new();
    if let Some(url) = legacy_github {
        repositories.push(json!({
            "id": "r_legacy_github",
            "alias": "Repositorio Oficial",
            "url": url,
            "type": "github",
        }));
    }
    if let Some(url) = legacy_drive {
        repositories.push(json!({
            "id": "r_legacy_drive",
            "alias": "Carpeta Drive",
            "url": url,
            "type": "drive",
        }));
    }
    record.insert("repositories".to_string(), Value::Array(repositories));
}

/// Synthesize a used-id ledger from the live projects, so the correlative
/// allocator has a floor on first run. Each project contributes one entry
/// stamped with its start date (falling back to `now`).
pub fn bootstrap_used_ids(projects: &[Record], now: &str) -> Vec<Record> {
    projects
        .iter()
        .filter_map(|project| {
            let id = record_id(project)?;
            let name = project.get("name").and_then(Value::as_str).unwrap_or("");
            let date = project
                .get("startDate")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(now);
            let entry = json!({
                "id": id,
                "name": name,
                "dateUsed": date,
                "createdBy": BOOTSTRAP_CREATOR,
            });
            match entry {
                Value::Object(map) => Some(map),
                _ => None,
            }
        })
        .collect()
}
