//! Engine configuration.

use serde::Deserialize;

/// Top-level engine configuration.
///
/// Supplied by the embedding application; every field has a sensible default so
/// an empty config section deserializes cleanly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Audit recorder configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Audit recorder configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Default number of entries returned by audit queries when the caller
    /// does not specify a limit.
    #[serde(default = "default_query_limit")]
    pub default_query_limit: usize,
    /// Hard cap on the length of a single entity's audit trail.
    #[serde(default = "default_trail_cap")]
    pub trail_cap: usize,
}

fn default_query_limit() -> usize {
    50
}

fn default_trail_cap() -> usize {
    1000
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_query_limit: default_query_limit(),
            trail_cap: default_trail_cap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.audit.default_query_limit, 50);
        assert_eq!(config.audit.trail_cap, 1000);
    }

    #[test]
    fn test_overrides_apply() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"audit": {"default_query_limit": 10}}"#).unwrap();
        assert_eq!(config.audit.default_query_limit, 10);
        assert_eq!(config.audit.trail_cap, 1000);
    }
}
