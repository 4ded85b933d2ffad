//! Configuration: `GraphConfig`, `ResourceLimits`, `SearchDefaults`.
//!
//! Plain `serde`-serializable structs with `#[serde(default)]` and a
//! `defaults` module of named constants, so the shape is self-documenting
//! and a partial JSON/TOML blob still deserializes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{GraphError, Result};

/// Default environment variable prefix used by [`GraphConfig::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "GOT_";

pub mod defaults {
    pub const MAX_THOUGHTS: usize = 10_000;
    pub const MAX_DEPTH: u32 = 20;
    pub const MAX_CONCURRENT_EXPANSIONS: usize = 10;
    pub const CHECKPOINT_INTERVAL: u64 = 100;
    pub const BEAM_WIDTH: usize = 3;
    pub const MAX_EXPANSIONS: usize = 100;
    pub const SCORE_THRESHOLD: f64 = 0.0;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    pub max_thoughts: usize,
    pub max_depth: u32,
    pub max_tokens: Option<u64>,
    pub timeout_seconds: Option<f64>,
    pub max_concurrent_expansions: usize,
    pub checkpoint_interval: Option<u64>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_thoughts: defaults::MAX_THOUGHTS,
            max_depth: defaults::MAX_DEPTH,
            max_tokens: None,
            timeout_seconds: None,
            max_concurrent_expansions: defaults::MAX_CONCURRENT_EXPANSIONS,
            checkpoint_interval: Some(defaults::CHECKPOINT_INTERVAL),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub beam_width: usize,
    pub max_expansions: usize,
    pub score_threshold: f64,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            beam_width: defaults::BEAM_WIDTH,
            max_expansions: defaults::MAX_EXPANSIONS,
            score_threshold: defaults::SCORE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub allow_cycles: bool,
    pub auto_checkpoint: bool,
    pub limits: ResourceLimits,
    pub search: SearchDefaults,
    pub enable_metrics: bool,
    pub enable_tracing: bool,
    pub enable_persistence: bool,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            allow_cycles: false,
            auto_checkpoint: false,
            limits: ResourceLimits::default(),
            search: SearchDefaults::default(),
            enable_metrics: true,
            enable_tracing: true,
            enable_persistence: false,
            metadata: HashMap::new(),
        }
    }
}

impl GraphConfig {
    /// Validate all rules at once, returning every violation rather than
    /// failing on the first (a config-validation report, not a fail-fast
    /// check).
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();

        if self.limits.max_thoughts < 1 {
            violations.push("limits.max_thoughts must be >= 1".to_string());
        }
        if self.limits.max_depth < 1 {
            violations.push("limits.max_depth must be >= 1".to_string());
        }
        if let Some(max_tokens) = self.limits.max_tokens {
            if max_tokens < 1 {
                violations.push("limits.max_tokens must be >= 1 when set".to_string());
            }
        }
        if let Some(timeout) = self.limits.timeout_seconds {
            if timeout <= 0.0 {
                violations.push("limits.timeout_seconds must be > 0 when set".to_string());
            }
        }
        if self.search.beam_width < 1 {
            violations.push("search.beam_width must be >= 1".to_string());
        }
        if self.search.max_expansions < 1 {
            violations.push("search.max_expansions must be >= 1".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(GraphError::configuration(violations))
        }
    }

    pub fn from_dict(value: serde_json::Value) -> Result<Self> {
        let config: GraphConfig = serde_json::from_value(value)
            .map_err(|e| GraphError::configuration(vec![e.to_string()]))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("GraphConfig is always serializable")
    }

    /// Load configuration from environment variables with the given prefix
    /// (default `GOT_`), falling back to defaults for anything missing or
    /// unparsable. Booleans accept `true/1/yes` and `false/0/no`
    /// case-insensitively; numeric fields silently keep their default on a
    /// parse failure rather than erroring, matching the reference loader.
    pub fn from_env(prefix: &str) -> Result<Self> {
        let mut config = GraphConfig::default();

        if let Some(v) = env_bool(prefix, "ALLOW_CYCLES") {
            config.allow_cycles = v;
        }
        if let Some(v) = env_bool(prefix, "AUTO_CHECKPOINT") {
            config.auto_checkpoint = v;
        }
        if let Some(v) = env_usize(prefix, "MAX_THOUGHTS") {
            config.limits.max_thoughts = v;
        }
        if let Some(v) = env_u32(prefix, "MAX_DEPTH") {
            config.limits.max_depth = v;
        }
        if let Some(v) = env_u64(prefix, "MAX_TOKENS") {
            config.limits.max_tokens = Some(v);
        }
        if let Some(v) = env_f64(prefix, "TIMEOUT_SECONDS") {
            config.limits.timeout_seconds = Some(v);
        }
        if let Some(v) = env_usize(prefix, "MAX_CONCURRENT_EXPANSIONS") {
            config.limits.max_concurrent_expansions = v;
        }
        if let Some(v) = env_u64(prefix, "CHECKPOINT_INTERVAL") {
            config.limits.checkpoint_interval = Some(v);
        }
        if let Some(v) = env_usize(prefix, "BEAM_WIDTH") {
            config.search.beam_width = v;
        }
        if let Some(v) = env_usize(prefix, "MAX_EXPANSIONS") {
            config.search.max_expansions = v;
        }
        if let Some(v) = env_f64(prefix, "SCORE_THRESHOLD") {
            config.search.score_threshold = v;
        }
        if let Some(v) = env_bool(prefix, "ENABLE_METRICS") {
            config.enable_metrics = v;
        }
        if let Some(v) = env_bool(prefix, "ENABLE_TRACING") {
            config.enable_tracing = v;
        }
        if let Some(v) = env_bool(prefix, "ENABLE_PERSISTENCE") {
            config.enable_persistence = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn env_var(prefix: &str, suffix: &str) -> Option<String> {
    std::env::var(format!("{prefix}{suffix}")).ok()
}

fn env_bool(prefix: &str, suffix: &str) -> Option<bool> {
    let raw = env_var(prefix, suffix)?;
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn env_usize(prefix: &str, suffix: &str) -> Option<usize> {
    env_var(prefix, suffix)?.parse().ok()
}

fn env_u32(prefix: &str, suffix: &str) -> Option<u32> {
    env_var(prefix, suffix)?.parse().ok()
}

fn env_u64(prefix: &str, suffix: &str) -> Option<u64> {
    env_var(prefix, suffix)?.parse().ok()
}

fn env_f64(prefix: &str, suffix: &str) -> Option<f64> {
    env_var(prefix, suffix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GraphConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_reports_every_violation_at_once() {
        let mut config = GraphConfig::default();
        config.limits.max_thoughts = 0;
        config.limits.max_depth = 0;
        config.search.beam_width = 0;
        let err = config.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("max_thoughts"));
        assert!(msg.contains("max_depth"));
        assert!(msg.contains("beam_width"));
    }

    #[test]
    fn optional_limits_validate_only_when_set() {
        let mut config = GraphConfig::default();
        config.limits.max_tokens = Some(0);
        assert!(config.validate().is_err());
        config.limits.max_tokens = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn round_trips_through_dict() {
        let mut config = GraphConfig::default();
        config.limits.max_depth = 7;
        let dict = config.to_dict();
        let restored = GraphConfig::from_dict(dict).unwrap();
        assert_eq!(restored.limits.max_depth, 7);
    }

    #[test]
    fn env_bool_accepts_case_insensitive_variants() {
        std::env::set_var("TGTEST_ALLOW_CYCLES", "YES");
        assert_eq!(env_bool("TGTEST_", "ALLOW_CYCLES"), Some(true));
        std::env::set_var("TGTEST_ALLOW_CYCLES", "No");
        assert_eq!(env_bool("TGTEST_", "ALLOW_CYCLES"), Some(false));
        std::env::remove_var("TGTEST_ALLOW_CYCLES");
    }

    #[test]
    fn env_numeric_falls_back_silently_on_bad_input() {
        std::env::set_var("TGTEST_MAX_DEPTH", "not-a-number");
        let config = GraphConfig::from_env("TGTEST_").unwrap();
        assert_eq!(config.limits.max_depth, defaults::MAX_DEPTH);
        std::env::remove_var("TGTEST_MAX_DEPTH");
    }
}
