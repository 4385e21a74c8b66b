//! Error types for the event log and its blob stores.
//!
//! Loading never fails: a missing or unreadable blob yields an empty log.
//! Only appends surface errors, through [`EventLogError`].

/// Errors raised by a [`BlobStore`](crate::store::BlobStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blob would exceed the store's capacity.
    #[error("quota exceeded writing '{key}': {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Blob key being written.
        key: String,
        /// Size of the rejected blob in bytes.
        needed: usize,
        /// Store capacity in bytes.
        quota: usize,
    },

    /// The key cannot be mapped to a storage location.
    #[error("invalid blob key: '{0}'")]
    InvalidKey(String),
}

/// Errors raised by [`EventLog`](crate::log::EventLog) operations.
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    /// Writing the serialized log failed. The event is still held in memory.
    #[error("failed to persist event log: {0}")]
    Persist(#[from] StoreError),

    /// The persisted log could not be read at load time, so writes are
    /// refused to keep it intact. The event is still held in memory.
    #[error("event log '{key}' was unreadable at load, refusing to overwrite it")]
    Degraded {
        /// Blob key of the unreadable log.
        key: String,
    },

    /// The log could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
