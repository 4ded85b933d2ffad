//! Search strategies: shared config/result types plus one module per
//! strategy, rather than one large match statement over a strategy enum.

pub mod beam;
pub mod best_first;
pub mod iterative_deepening;
pub mod mcts;

pub use beam::beam_search;
pub use best_first::best_first_search;
pub use iterative_deepening::iterative_deepening_search;
pub use mcts::mcts_search;

use std::collections::HashMap;

use crate::thought::Thought;

/// Per-search tuning, falling back to the owning [`Graph`](crate::graph::Graph)'s
/// config when a field is left `None`.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub max_depth: u32,
    pub beam_width: usize,
    pub max_expansions: usize,
    pub max_tokens: Option<u64>,
    pub timeout_seconds: Option<f64>,
    pub score_threshold: f64,
}

impl SearchConfig {
    pub fn from_graph_config(config: &crate::config::GraphConfig) -> Self {
        Self {
            max_depth: config.limits.max_depth,
            beam_width: config.search.beam_width,
            max_expansions: config.search.max_expansions,
            max_tokens: config.limits.max_tokens,
            timeout_seconds: config.limits.timeout_seconds,
            score_threshold: config.search.score_threshold,
        }
    }
}

/// Exhaustive termination taxonomy; a strategy always picks exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    NoRoots,
    GoalReached,
    MaxDepth,
    MaxExpansions,
    BudgetExhausted,
    Timeout,
    Completed,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationReason::NoRoots => "no_roots",
            TerminationReason::GoalReached => "goal_reached",
            TerminationReason::MaxDepth => "max_depth",
            TerminationReason::MaxExpansions => "max_expansions",
            TerminationReason::BudgetExhausted => "budget_exhausted",
            TerminationReason::Timeout => "timeout",
            TerminationReason::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult<T> {
    pub best_path: Vec<Thought<T>>,
    pub best_score: f64,
    pub thoughts_explored: usize,
    pub thoughts_expanded: usize,
    pub total_tokens_used: u64,
    pub wall_time_seconds: f64,
    pub termination_reason: TerminationReason,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<T> SearchResult<T> {
    pub fn empty(reason: TerminationReason, wall_time_seconds: f64) -> Self {
        Self {
            best_path: Vec::new(),
            best_score: 0.0,
            thoughts_explored: 0,
            thoughts_expanded: 0,
            total_tokens_used: 0,
            wall_time_seconds,
            termination_reason: reason,
            metadata: HashMap::new(),
        }
    }
}

/// Every strategy's iteration caps (timeout/expansions/tokens) are the same
/// four counters; strategies hold a [`ResourceLimiter`] rather than
/// reimplementing the bookkeeping themselves.
pub(crate) use crate::limits::ResourceLimiter as Budget;
