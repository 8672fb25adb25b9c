//! Append-only audit trail.
//!
//! Every mutating call in the engine records who changed what, when, and with
//! what before/after snapshots. Entries are immutable once written.

pub mod error;
pub mod recorder;
pub mod types;

pub use error::AuditError;
pub use recorder::AuditRecorder;
pub use types::{
    AuditEntityType, AuditLog, AuditQuery, NewAuditLog, OperationStatistics, OperationType,
};

/// Serializes an entity into an opaque audit snapshot.
///
/// Returns `None` when the value cannot be represented as JSON; snapshots are
/// best-effort context, never load-bearing data.
pub fn snapshot<T: serde::Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}
