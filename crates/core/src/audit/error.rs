//! Audit recorder error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while recording or querying the audit trail.
#[derive(Debug, Error)]
pub enum AuditError {
    /// An operation type name did not match any known operation.
    #[error("Unknown operation type: {0}")]
    UnknownOperationType(String),

    /// An entity type name did not match any known entity.
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// The operator field was empty; every audit entry must say who acted.
    #[error("Audit entry is missing an operator")]
    MissingOperator,

    /// Persistence gateway failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AuditError {
    /// Returns the error code for logs and reports.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownOperationType(_) => "UNKNOWN_OPERATION_TYPE",
            Self::UnknownEntityType(_) => "UNKNOWN_ENTITY_TYPE",
            Self::MissingOperator => "MISSING_OPERATOR",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}
