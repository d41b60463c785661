//! Process configuration
//!
//! Defaults reproduce the reference deployment: constant sample `6` /
//! `[2, 3, 4]`, one-second timers, topics `/target`, `/input`, `/solution`,
//! queue depth 10. A JSON file named by `TWO_SUM_NODE_CONFIG` may override
//! any subset of fields.

use std::ffi::OsString;
use std::path::Path;

use correlator::CorrelatorConfig;
use emitter::EmitterConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "TWO_SUM_NODE_CONFIG";

/// Configuration for the whole process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub emitter: EmitterConfig,
    pub correlator: CorrelatorConfig,
    /// Run a consumer that logs every published result.
    pub log_results: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            emitter: EmitterConfig::default(),
            correlator: CorrelatorConfig::default(),
            log_results: true,
        }
    }
}

impl NodeConfig {
    /// Load from the file named by [`CONFIG_ENV_VAR`], or defaults if unset.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(std::env::var_os(CONFIG_ENV_VAR))
    }

    /// Load from an optional path.
    pub fn load_from(path: Option<OsString>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => {
                info!("No config file given; using defaults");
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&raw, &path.display().to_string())?;
        info!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Self::parse(raw, "<inline>")
    }

    fn parse(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the runtime can not honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.correlator.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("correlator.tick_period_ms must be non-zero".to_string()));
        }
        if self.emitter.enabled && self.emitter.period_ms == 0 {
            return Err(ConfigError::Invalid("emitter.period_ms must be non-zero".to_string()));
        }
        if self.correlator.queue_depth == 0 || (self.emitter.enabled && self.emitter.queue_depth == 0) {
            return Err(ConfigError::Invalid("queue_depth must be at least 1".to_string()));
        }
        if self.emitter.enabled {
            self.emitter
                .source
                .build()
                .map_err(|e| ConfigError::Invalid(format!("emitter.source: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.log_results);
        assert!(config.emitter.enabled);
        assert_eq!(config.emitter.target_topic, config.correlator.target_topic);
        assert_eq!(config.emitter.candidates_topic, config.correlator.candidates_topic);
    }

    #[test]
    fn test_partial_override() {
        let config = NodeConfig::from_json_str(
            r#"{"correlator": {"publish_empty_result": false}, "emitter": {"period_ms": 250}}"#,
        )
        .unwrap();

        assert!(!config.correlator.publish_empty_result);
        assert_eq!(config.correlator.tick_period_ms, 1000);
        assert_eq!(config.emitter.period_ms, 250);
        assert_eq!(config.emitter.node_name, "minimal_publisher");
    }

    #[test]
    fn test_zero_tick_period_rejected() {
        let err = NodeConfig::from_json_str(r#"{"correlator": {"tick_period_ms": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_oversized_random_source_rejected_at_load() {
        let err = NodeConfig::from_json_str(
            r#"{"emitter": {"source": {"kind": "random", "seed": 3, "min_len": 0, "max_len": 10000000000000, "min_value": -5, "max_value": 5}}}"#,
        )
        .unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.starts_with("emitter.source"), "{msg}"),
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_disabled_emitter_period_ignored() {
        let config =
            NodeConfig::from_json_str(r#"{"emitter": {"enabled": false, "period_ms": 0}}"#).unwrap();
        assert!(!config.emitter.enabled);
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = NodeConfig::from_json_str("{ not json").unwrap_err();
        match err {
            ConfigError::Parse { origin, .. } => assert_eq!(origin, "<inline>"),
            other => panic!("Expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        assert_eq!(NodeConfig::load_from(None).unwrap(), NodeConfig::default());
        assert_eq!(
            NodeConfig::load_from(Some(OsString::new())).unwrap(),
            NodeConfig::default()
        );
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = NodeConfig::load_from(Some(OsString::from("/nonexistent/two-sum.json"))).unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert_eq!(path, Path::new("/nonexistent/two-sum.json")),
            other => panic!("Expected Io, got {:?}", other),
        }
    }
}
