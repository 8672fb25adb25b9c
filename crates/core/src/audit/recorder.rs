//! Append-only audit trail recorder and queries.

use chrono::{DateTime, Utc};
use tallybook_shared::config::AuditConfig;
use tallybook_shared::types::AuditLogId;
use tracing::debug;

use super::error::AuditError;
use super::types::{AuditEntityType, AuditLog, AuditQuery, NewAuditLog, OperationStatistics};
use crate::store::Gateway;

/// Records and queries the append-only audit trail.
///
/// Every mutating service call appends exactly one entry per mutated entity,
/// immediately after the domain write succeeds. The pair is not atomic: a
/// crash between the two loses the audit record. That gap is documented
/// behavior, not something the recorder can repair.
#[derive(Clone)]
pub struct AuditRecorder<'a> {
    store: &'a dyn Gateway,
    config: AuditConfig,
}

impl<'a> AuditRecorder<'a> {
    /// Creates a recorder over the given gateway.
    #[must_use]
    pub fn new(store: &'a dyn Gateway, config: AuditConfig) -> Self {
        Self { store, config }
    }

    /// Rejects a blank operator.
    ///
    /// Services call this before their first store write, so a bad operator
    /// can never leave a domain row behind without its audit entry.
    pub fn ensure_operator(&self, operator: &str) -> Result<(), AuditError> {
        if operator.trim().is_empty() {
            return Err(AuditError::MissingOperator);
        }
        Ok(())
    }

    /// Appends one audit entry and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::MissingOperator`] when the operator is blank, or
    /// a store error when the append fails.
    pub fn log_operation(&self, entry: NewAuditLog) -> Result<AuditLogId, AuditError> {
        self.ensure_operator(&entry.operator)?;
        let log = AuditLog {
            id: AuditLogId::new(),
            operation: entry.operation,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            entity_name: entry.entity_name,
            operator: entry.operator,
            recorded_at: Utc::now(),
            description: entry.description,
            old_value: entry.old_value,
            new_value: entry.new_value,
            notes: entry.notes,
        };
        debug!(
            operation = %log.operation,
            entity_type = %log.entity_type,
            entity_id = %log.entity_id,
            "audit entry recorded"
        );
        Ok(self.store.save_audit_log(log)?)
    }

    /// Returns audit entries matching the query, newest first.
    pub fn query(&self, query: &AuditQuery) -> Result<Vec<AuditLog>, AuditError> {
        let limit = query.limit.unwrap_or(self.config.default_query_limit);
        let logs = self.store.list_audit_logs()?;
        Ok(logs
            .into_iter()
            .rev()
            .filter(|log| {
                query.entity_type.is_none_or(|t| log.entity_type == t)
                    && query
                        .entity_id
                        .as_ref()
                        .is_none_or(|id| &log.entity_id == id)
                    && query
                        .operator
                        .as_ref()
                        .is_none_or(|op| &log.operator == op)
                    && query.from.is_none_or(|from| log.recorded_at >= from)
                    && query.to.is_none_or(|to| log.recorded_at <= to)
            })
            .take(limit)
            .collect())
    }

    /// Returns the full newest-first history of one entity, capped at the
    /// configured trail length.
    pub fn entity_trail(
        &self,
        entity_type: AuditEntityType,
        entity_id: &str,
    ) -> Result<Vec<AuditLog>, AuditError> {
        self.query(&AuditQuery {
            entity_type: Some(entity_type),
            entity_id: Some(entity_id.to_string()),
            limit: Some(self.config.trail_cap),
            ..AuditQuery::default()
        })
    }

    /// Counts entries grouped by operation type, entity type and operator
    /// over an optional inclusive time range.
    pub fn operation_statistics(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<OperationStatistics, AuditError> {
        let logs = self.store.list_audit_logs()?;
        let mut stats = OperationStatistics::default();
        for log in logs.into_iter().filter(|log| {
            from.is_none_or(|f| log.recorded_at >= f) && to.is_none_or(|t| log.recorded_at <= t)
        }) {
            stats.total += 1;
            *stats.by_operation.entry(log.operation).or_default() += 1;
            *stats.by_entity.entry(log.entity_type).or_default() += 1;
            *stats.by_operator.entry(log.operator).or_default() += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::OperationType;
    use crate::store::MemoryStore;

    fn entry(operation: OperationType, entity_id: &str, operator: &str) -> NewAuditLog {
        NewAuditLog {
            operation,
            entity_type: AuditEntityType::Income,
            entity_id: entity_id.to_string(),
            entity_name: "income".into(),
            operator: operator.to_string(),
            description: format!("{operation} on {entity_id}"),
            old_value: None,
            new_value: None,
            notes: None,
        }
    }

    #[test]
    fn test_log_and_query_newest_first() {
        let store = MemoryStore::new();
        let recorder = AuditRecorder::new(&store, AuditConfig::default());

        recorder.log_operation(entry(OperationType::Create, "a", "anna")).unwrap();
        recorder.log_operation(entry(OperationType::Update, "a", "anna")).unwrap();
        recorder.log_operation(entry(OperationType::Allocate, "b", "ben")).unwrap();

        let all = recorder.query(&AuditQuery::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].operation, OperationType::Allocate);
        assert_eq!(all[2].operation, OperationType::Create);
    }

    #[test]
    fn test_query_filters_by_operator_and_entity() {
        let store = MemoryStore::new();
        let recorder = AuditRecorder::new(&store, AuditConfig::default());

        recorder.log_operation(entry(OperationType::Create, "a", "anna")).unwrap();
        recorder.log_operation(entry(OperationType::Create, "b", "ben")).unwrap();

        let by_operator = recorder
            .query(&AuditQuery {
                operator: Some("ben".into()),
                ..AuditQuery::default()
            })
            .unwrap();
        assert_eq!(by_operator.len(), 1);
        assert_eq!(by_operator[0].entity_id, "b");

        let by_entity = recorder.entity_trail(AuditEntityType::Income, "a").unwrap();
        assert_eq!(by_entity.len(), 1);
        assert_eq!(by_entity[0].operator, "anna");
    }

    #[test]
    fn test_query_respects_limit() {
        let store = MemoryStore::new();
        let config = AuditConfig {
            default_query_limit: 2,
            trail_cap: 1000,
        };
        let recorder = AuditRecorder::new(&store, config);

        for i in 0..5 {
            recorder
                .log_operation(entry(OperationType::Create, &i.to_string(), "anna"))
                .unwrap();
        }
        let limited = recorder.query(&AuditQuery::default()).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].entity_id, "4");
    }

    #[test]
    fn test_ensure_operator_trims_whitespace() {
        let store = MemoryStore::new();
        let recorder = AuditRecorder::new(&store, AuditConfig::default());
        assert!(recorder.ensure_operator("anna").is_ok());
        assert!(matches!(
            recorder.ensure_operator(" \t"),
            Err(AuditError::MissingOperator)
        ));
    }

    #[test]
    fn test_empty_operator_rejected() {
        let store = MemoryStore::new();
        let recorder = AuditRecorder::new(&store, AuditConfig::default());
        let err = recorder
            .log_operation(entry(OperationType::Create, "a", "  "))
            .unwrap_err();
        assert!(matches!(err, AuditError::MissingOperator));
        assert!(store.list_audit_logs().unwrap().is_empty());
    }

    /// Saves an entry directly so the timestamp is under test control.
    fn log_at(
        store: &MemoryStore,
        recorded_at: DateTime<Utc>,
        operation: OperationType,
        entity_id: &str,
        operator: &str,
    ) {
        store
            .save_audit_log(AuditLog {
                id: tallybook_shared::types::AuditLogId::new(),
                operation,
                entity_type: AuditEntityType::Income,
                entity_id: entity_id.to_string(),
                entity_name: "income".into(),
                operator: operator.to_string(),
                recorded_at,
                description: format!("{operation} on {entity_id}"),
                old_value: None,
                new_value: None,
                notes: None,
            })
            .unwrap();
    }

    #[test]
    fn test_query_time_range_is_inclusive() {
        let store = MemoryStore::new();
        let recorder = AuditRecorder::new(&store, AuditConfig::default());
        let noon = Utc::now();
        let before = noon - chrono::Duration::seconds(10);
        let after = noon + chrono::Duration::seconds(10);
        log_at(&store, before, OperationType::Create, "a", "anna");
        log_at(&store, noon, OperationType::Update, "b", "anna");
        log_at(&store, after, OperationType::Match, "c", "ben");

        // A boundary timestamp matches on both ends.
        let ranged = recorder
            .query(&AuditQuery {
                from: Some(noon),
                to: Some(after),
                ..AuditQuery::default()
            })
            .unwrap();
        assert_eq!(ranged.len(), 2);
        assert_eq!(ranged[0].entity_id, "c");
        assert_eq!(ranged[1].entity_id, "b");

        let up_to_noon = recorder
            .query(&AuditQuery {
                to: Some(noon),
                ..AuditQuery::default()
            })
            .unwrap();
        assert_eq!(up_to_noon.len(), 2);

        let exactly_noon = recorder
            .query(&AuditQuery {
                from: Some(noon),
                to: Some(noon),
                ..AuditQuery::default()
            })
            .unwrap();
        assert_eq!(exactly_noon.len(), 1);
        assert_eq!(exactly_noon[0].entity_id, "b");
    }

    #[test]
    fn test_operation_statistics_time_range_is_inclusive() {
        let store = MemoryStore::new();
        let recorder = AuditRecorder::new(&store, AuditConfig::default());
        let noon = Utc::now();
        log_at(&store, noon - chrono::Duration::seconds(10), OperationType::Create, "a", "anna");
        log_at(&store, noon, OperationType::Update, "b", "anna");
        log_at(&store, noon + chrono::Duration::seconds(10), OperationType::Match, "c", "ben");

        let from_noon = recorder.operation_statistics(Some(noon), None).unwrap();
        assert_eq!(from_noon.total, 2);
        assert_eq!(from_noon.by_operation[&OperationType::Update], 1);
        assert_eq!(from_noon.by_operation[&OperationType::Match], 1);

        let up_to_noon = recorder.operation_statistics(None, Some(noon)).unwrap();
        assert_eq!(up_to_noon.total, 2);
        assert_eq!(up_to_noon.by_operator["anna"], 2);

        let exactly_noon = recorder
            .operation_statistics(Some(noon), Some(noon))
            .unwrap();
        assert_eq!(exactly_noon.total, 1);
    }

    #[test]
    fn test_operation_statistics_groups() {
        let store = MemoryStore::new();
        let recorder = AuditRecorder::new(&store, AuditConfig::default());

        recorder.log_operation(entry(OperationType::Create, "a", "anna")).unwrap();
        recorder.log_operation(entry(OperationType::Create, "b", "anna")).unwrap();
        recorder.log_operation(entry(OperationType::Match, "c", "ben")).unwrap();

        let stats = recorder.operation_statistics(None, None).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_operation[&OperationType::Create], 2);
        assert_eq!(stats.by_operation[&OperationType::Match], 1);
        assert_eq!(stats.by_operator["anna"], 2);
        assert_eq!(stats.by_entity[&AuditEntityType::Income], 3);
    }
}
