//! Error types for the policy layer.
//!
//! The boolean policies (`should_show`, `try_trigger`) never surface these:
//! they collapse every failure into their fail-open / fail-closed default.
//! Fallible variants and history writes return them so callers and tests can
//! see what went wrong.

/// Failure reported by a [`crate::store::KeyValueStore`] backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing store cannot be reached (disabled, private mode, no window).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The store refused a write (quota exceeded, security error).
    #[error("storage rejected write to `{key}`: {reason}")]
    Rejected { key: String, reason: String },
}

/// Unified error type for policy operations.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// Underlying key-value store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A persisted value exists but could not be decoded.
    #[error("malformed value under `{key}`: {reason}")]
    Malformed { key: String, reason: String },

    /// A device limit table violates its ordering invariants.
    #[error("invalid device limit table: {0}")]
    InvalidTable(String),

    /// Configuration JSON could not be parsed.
    #[error("invalid policy config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl PolicyError {
    pub(crate) fn malformed(key: &str, reason: impl ToString) -> Self {
        PolicyError::Malformed {
            key: key.to_owned(),
            reason: reason.to_string(),
        }
    }
}
