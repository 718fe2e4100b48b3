//! Error types for Glim storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored key does not have the expected layout.
    #[error("corrupt key in {column_family}")]
    CorruptKey {
        /// Column family holding the key.
        column_family: &'static str,
    },
}

impl From<StoreError> for glim_core::EconomyError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
