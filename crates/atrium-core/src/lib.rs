//! Atrium Core Library
//!
//! Persistence and sync core for the Atrium internal portal:
//! - Schemaless record store (users, projects, gems, tools, used ids)
//! - SQLite-backed local persistence with seed reconciliation on load
//! - Best-effort cloud mirroring through an HTTP SQL proxy
//! - Correlative project id allocation with an append-only ledger
//! - Credential checks and CSV import

pub mod auth;
pub mod config;
pub mod error;
pub mod etl;
pub mod merge;
pub mod mirror;
pub mod model;
pub mod seed;
pub mod storage;
pub mod store;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::mirror::{CloudSqlConfig, HttpMirror, RemoteMirror, SqlProvider};
    pub use crate::model::{Record, Table};
    pub use crate::storage::{Database, LocalStore};
    pub use crate::store::{AlterAction, MirrorStatus, Store};
}
