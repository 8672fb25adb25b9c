//! Audit trail domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tallybook_shared::types::AuditLogId;

use super::error::AuditError;

/// Kind of mutation an audit entry describes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    /// A new entity was created.
    Create,
    /// An existing entity was updated.
    Update,
    /// An entity was deleted (external callers only; the engine never deletes).
    Delete,
    /// An amount was allocated across targets.
    Allocate,
    /// Two records were matched to each other.
    Match,
    /// An accounting period was adjusted.
    Adjust,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Allocate => "ALLOCATE",
            Self::Match => "MATCH",
            Self::Adjust => "ADJUST",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for OperationType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            "ALLOCATE" => Ok(Self::Allocate),
            "MATCH" => Ok(Self::Match),
            "ADJUST" => Ok(Self::Adjust),
            _ => Err(AuditError::UnknownOperationType(s.to_string())),
        }
    }
}

/// Entity vocabulary the audit trail can describe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntityType {
    /// A customer.
    Customer,
    /// A supplier.
    Supplier,
    /// A sales order.
    Order,
    /// An income record.
    Income,
    /// An expense record.
    Expense,
    /// A bank account.
    BankAccount,
    /// A bank transaction.
    BankTransaction,
    /// A typed allocation row.
    Allocation,
    /// An accounting period.
    AccountingPeriod,
}

impl std::fmt::Display for AuditEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Customer => "customer",
            Self::Supplier => "supplier",
            Self::Order => "order",
            Self::Income => "income",
            Self::Expense => "expense",
            Self::BankAccount => "bank_account",
            Self::BankTransaction => "bank_transaction",
            Self::Allocation => "allocation",
            Self::AccountingPeriod => "accounting_period",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for AuditEntityType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "supplier" => Ok(Self::Supplier),
            "order" => Ok(Self::Order),
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "bank_account" => Ok(Self::BankAccount),
            "bank_transaction" => Ok(Self::BankTransaction),
            "allocation" => Ok(Self::Allocation),
            "accounting_period" => Ok(Self::AccountingPeriod),
            _ => Err(AuditError::UnknownEntityType(s.to_string())),
        }
    }
}

/// An immutable audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// Unique identifier.
    pub id: AuditLogId,
    /// Kind of mutation.
    pub operation: OperationType,
    /// Entity type mutated.
    pub entity_type: AuditEntityType,
    /// Mutated entity's id, as a string.
    pub entity_id: String,
    /// Human-readable entity name.
    pub entity_name: String,
    /// Operator that performed the mutation.
    pub operator: String,
    /// When the mutation was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Human-readable description of the mutation.
    pub description: String,
    /// Entity snapshot before the mutation.
    pub old_value: Option<serde_json::Value>,
    /// Entity snapshot after the mutation.
    pub new_value: Option<serde_json::Value>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Input for appending an audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    /// Kind of mutation.
    pub operation: OperationType,
    /// Entity type mutated.
    pub entity_type: AuditEntityType,
    /// Mutated entity's id, as a string.
    pub entity_id: String,
    /// Human-readable entity name.
    pub entity_name: String,
    /// Operator that performed the mutation.
    pub operator: String,
    /// Human-readable description of the mutation.
    pub description: String,
    /// Entity snapshot before the mutation.
    pub old_value: Option<serde_json::Value>,
    /// Entity snapshot after the mutation.
    pub new_value: Option<serde_json::Value>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Filter for audit queries. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    /// Restrict to one entity type.
    pub entity_type: Option<AuditEntityType>,
    /// Restrict to one entity id.
    pub entity_id: Option<String>,
    /// Restrict to one operator.
    pub operator: Option<String>,
    /// Inclusive lower time bound.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper time bound.
    pub to: Option<DateTime<Utc>>,
    /// Maximum entries returned; the recorder's configured default applies
    /// when unset.
    pub limit: Option<usize>,
}

/// Aggregate counts over a slice of the audit trail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationStatistics {
    /// Entries considered.
    pub total: usize,
    /// Counts grouped by operation type.
    pub by_operation: BTreeMap<OperationType, usize>,
    /// Counts grouped by entity type.
    pub by_entity: BTreeMap<AuditEntityType, usize>,
    /// Counts grouped by operator.
    pub by_operator: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn test_operation_type_parse_roundtrip() {
        for op in [
            OperationType::Create,
            OperationType::Update,
            OperationType::Delete,
            OperationType::Allocate,
            OperationType::Match,
            OperationType::Adjust,
        ] {
            assert_eq!(OperationType::from_str(&op.to_string()).unwrap(), op);
        }
    }

    #[rstest]
    #[case("allocate", OperationType::Allocate)]
    #[case("ALLOCATE", OperationType::Allocate)]
    #[case("Match", OperationType::Match)]
    #[case("adjust", OperationType::Adjust)]
    fn test_operation_type_parse_case_insensitive(
        #[case] input: &str,
        #[case] expected: OperationType,
    ) {
        assert_eq!(OperationType::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_operation_type_unknown_is_err() {
        let err = OperationType::from_str("TRANSMOGRIFY").unwrap_err();
        assert!(matches!(err, AuditError::UnknownOperationType(_)));
    }

    #[test]
    fn test_entity_type_parse_roundtrip() {
        for entity in [
            AuditEntityType::Customer,
            AuditEntityType::Supplier,
            AuditEntityType::Order,
            AuditEntityType::Income,
            AuditEntityType::Expense,
            AuditEntityType::BankAccount,
            AuditEntityType::BankTransaction,
            AuditEntityType::Allocation,
            AuditEntityType::AccountingPeriod,
        ] {
            assert_eq!(AuditEntityType::from_str(&entity.to_string()).unwrap(), entity);
        }
    }

    #[test]
    fn test_entity_type_unknown_is_err() {
        let err = AuditEntityType::from_str("spaceship").unwrap_err();
        assert!(matches!(err, AuditError::UnknownEntityType(_)));
    }
}
