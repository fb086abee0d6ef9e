use crate::id::EntityId;
use thiserror::Error;

/// Why a snapshot could not be loaded or saved.
///
/// Every variant leaves the in-memory diagram untouched; callers show the
/// message and let the user retry.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot version {found:?} does not match supported version {expected:?}")]
    VersionMismatch { expected: String, found: String },

    #[error("malformed snapshot: {0}")]
    MalformedDocument(String),

    #[error("connection {connection} references missing node {node}")]
    DanglingReference { connection: EntityId, node: EntityId },

    #[error("snapshot file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}
