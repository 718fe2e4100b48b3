//! Error types for the Glim economy.

use crate::ids::IdError;

/// Result type for economy operations.
pub type Result<T> = std::result::Result<T, EconomyError>;

/// Errors that can occur in economy operations.
#[derive(Debug, thiserror::Error)]
pub enum EconomyError {
    /// The daily rewarded-video limit has been reached.
    #[error("daily rewarded video limit reached: {watched}/{cap}")]
    CapExceeded {
        /// Rewarded videos already watched today.
        watched: u32,
        /// Configured daily cap.
        cap: u32,
    },

    /// Offerwall completion with a missing id or a non-positive value.
    #[error("invalid offer data: {0}")]
    InvalidOffer(String),

    /// Quest definition rejected.
    #[error("invalid quest: {0}")]
    InvalidQuest(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Ledger, watch log or quest write failed.
    #[error("storage error: {0}")]
    Storage(String),
}
