//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A unique key is already taken.
    #[error("duplicate key '{key}' in {collection}")]
    DuplicateKey { collection: String, key: String },

    /// The document changed since it was read.
    #[error("version conflict on {collection} '{id}'")]
    VersionConflict { collection: String, id: String },

    /// The document to modify does not exist.
    #[error("{collection} '{id}' not found")]
    NotFound { collection: String, id: String },

    /// The backend did not answer in time.
    #[error("{backend} call timed out after {after_ms} ms")]
    Timeout { backend: String, after_ms: u64 },

    /// A lock guarding in-memory state was poisoned.
    #[error("lock poisoned: {0}")]
    Lock(String),

    /// Any other backend error.
    #[error("{backend} error: {message}")]
    Backend { backend: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::DuplicateKey {
            collection: "users".to_string(),
            key: "email".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate key 'email' in users");

        let err = StorageError::Timeout {
            backend: "mongodb".to_string(),
            after_ms: 5000,
        };
        assert_eq!(err.to_string(), "mongodb call timed out after 5000 ms");
    }
}
