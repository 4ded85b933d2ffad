//! Thought and edge value types.
//!
//! Thoughts and edges are plain records; the graph store is the sole owner
//! of live instances; everything here is `Clone` so callers and strategies
//! can hold snapshots without aliasing the store's internal state.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a thought. `Pruned` and `Merged` are terminal with
/// respect to further expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThoughtStatus {
    Pending,
    Active,
    Completed,
    Pruned,
    Merged,
    Failed,
}

impl ThoughtStatus {
    /// Name used in the serialized record, also accepted case-sensitively
    /// on load; an unrecognized name is a `GraphError::Configuration`.
    pub fn as_str(self) -> &'static str {
        match self {
            ThoughtStatus::Pending => "PENDING",
            ThoughtStatus::Active => "ACTIVE",
            ThoughtStatus::Completed => "COMPLETED",
            ThoughtStatus::Pruned => "PRUNED",
            ThoughtStatus::Merged => "MERGED",
            ThoughtStatus::Failed => "FAILED",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        match name {
            "PENDING" => Some(ThoughtStatus::Pending),
            "ACTIVE" => Some(ThoughtStatus::Active),
            "COMPLETED" => Some(ThoughtStatus::Completed),
            "PRUNED" => Some(ThoughtStatus::Pruned),
            "MERGED" => Some(ThoughtStatus::Merged),
            "FAILED" => Some(ThoughtStatus::Failed),
            _ => None,
        }
    }
}

/// A node in the reasoning graph. `T` is the opaque content type; the engine
/// never interprets it beyond passing it to the generator/evaluator.
#[derive(Debug, Clone)]
pub struct Thought<T> {
    pub id: String,
    pub content: T,
    pub score: f64,
    pub depth: u32,
    pub status: ThoughtStatus,
    pub tokens_used: u64,
    pub generation_time_ms: f64,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<T> Thought<T> {
    pub fn new(id: impl Into<String>, content: T, depth: u32) -> Self {
        Self {
            id: id.into(),
            content,
            score: 0.0,
            depth,
            status: ThoughtStatus::Pending,
            tokens_used: 0,
            generation_time_ms: 0.0,
            metadata: HashMap::new(),
        }
    }
}

impl<T> PartialEq for Thought<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<T> Eq for Thought<T> {}

/// Orders by score, highest first, so a `BinaryHeap<Thought<T>>` behaves as
/// a max-heap over score. Ties do not need to be meaningful here: callers
/// that require reproducible tie-breaks (best-first, MCTS) maintain their
/// own insertion counter alongside this ordering.
impl<T> PartialOrd for Thought<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for Thought<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
    }
}

/// Reserved edge relation labels the core carries verbatim without
/// interpreting; callers are free to use arbitrary labels.
pub const RELATION_LEADS_TO: &str = "leads_to";
pub const RELATION_MERGES_INTO: &str = "merges_into";
pub const RELATION_DEPENDS_ON: &str = "depends_on";
pub const RELATION_AFFECTS: &str = "affects";

#[derive(Debug, Clone)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub relation: String,
    pub weight: f64,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Edge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation: RELATION_LEADS_TO.to_string(),
            weight: 1.0,
            metadata: HashMap::new(),
        }
    }
}
