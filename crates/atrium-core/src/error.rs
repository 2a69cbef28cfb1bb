//! Error types for Atrium

use thiserror::Error;

/// Result type alias using Atrium's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Atrium error types
///
/// Local persistence errors are fatal to the operation that triggered them.
/// Remote mirror errors are isolated at the mirror boundary: on the mutation
/// path they are downgraded to a [`MirrorStatus::Failed`](crate::store::MirrorStatus)
/// warning, and only explicit cloud actions (test connection, initialize
/// schema, migrate) propagate them to the caller.
#[derive(Error, Debug)]
pub enum Error {
    // Local persistence errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Remote mirror errors
    #[error("Cloud SQL error: {0}")]
    RemoteMirror(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // Auth errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    // Input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error originated on the remote mirror path.
    ///
    /// Remote-path errors never unwind a local mutation that has already
    /// succeeded.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteMirror(_) | Self::Network(_))
    }
}
