//! Persistence gateway error types.

use thiserror::Error;

/// Errors the persistence gateway can return.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced entity does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Optimistic-concurrency check failed: someone else saved the entity
    /// since it was read.
    #[error("Version conflict: expected {expected}, found {found}")]
    VersionConflict {
        /// Version currently stored.
        expected: u64,
        /// Version the caller attempted to save.
        found: u64,
    },

    /// The backing storage returned unusable data.
    #[error("Storage corruption: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Returns the error code for logs and reports.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::VersionConflict { .. } => "VERSION_CONFLICT",
            Self::Corrupt(_) => "STORAGE_CORRUPT",
        }
    }

    /// Returns true if retrying the whole read-modify-write may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
