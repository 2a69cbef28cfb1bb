//! Storage layer - SQLite-backed key-value persistence
//!
//! - `database`: connection pool management and initialization
//! - `local`: the key → string local store adapter every collection
//!   serializes into

pub mod database;
pub mod local;

pub use database::{default_database_path, Database, DatabaseConfig};
pub use local::{LocalStore, CLOUD_SQL_CONFIG_KEY};
