//! Error taxonomy for the reasoning graph core.
//!
//! Mirrors the error-kind table in the specification: the first six kinds
//! are programmer-visible and propagate; `GenerationError`/`EvaluationError`
//! are caught internally by the expansion engine and never escape to a
//! strategy's mainline; timeouts and exhausted budgets are not errors at
//! all, they surface as a `termination_reason` on `SearchResult`.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("thought not found: {id}")]
    NodeNotFound { id: String },

    #[error("adding edge {from} -> {target} would create a cycle")]
    CycleDetected { from: String, target: String },

    #[error("resource exhausted: {kind} limit of {limit} reached")]
    ResourceExhausted { kind: String, limit: usize },

    #[error("graph error: {message}")]
    Graph { message: String },

    #[error("generator failed: {message}")]
    Generation { message: String },

    #[error("evaluator failed: {message}")]
    Evaluation { message: String },

    #[error("persistence error during {op}: {cause}")]
    Persistence { op: String, cause: String },

    #[error("invalid configuration: {}", .violations.join("; "))]
    Configuration { violations: Vec<String> },
}

impl GraphError {
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    pub fn cycle_detected(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::CycleDetected {
            from: source.into(),
            target: target.into(),
        }
    }

    pub fn resource_exhausted(kind: impl Into<String>, limit: usize) -> Self {
        Self::ResourceExhausted {
            kind: kind.into(),
            limit,
        }
    }

    pub fn graph(message: impl Into<String>) -> Self {
        Self::Graph {
            message: message.into(),
        }
    }

    pub fn configuration(violations: Vec<String>) -> Self {
        Self::Configuration { violations }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_not_found_carries_id() {
        let err = GraphError::node_not_found("abc123");
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn cycle_detected_carries_both_endpoints() {
        let err = GraphError::cycle_detected("a", "b");
        let msg = err.to_string();
        assert!(msg.contains('a') && msg.contains('b'));
    }

    #[test]
    fn configuration_error_joins_all_violations() {
        let err = GraphError::configuration(vec!["max_depth must be >= 1".into(), "beam_width must be >= 1".into()]);
        let msg = err.to_string();
        assert!(msg.contains("max_depth") && msg.contains("beam_width"));
    }
}
