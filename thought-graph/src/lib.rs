//! A Graph-of-Thought reasoning engine: a directed acyclic graph of
//! "thoughts" explored by pluggable generator/evaluator/verifier
//! collaborators and one of several search strategies (beam, best-first,
//! Monte Carlo tree search, iterative deepening).
//!
//! The crate is organized around a `graph` module owning the data structure
//! and its invariants, a `search` module of independent strategies layered
//! on top, and flat top-level modules for the cross-cutting concerns
//! (`config`, `errors`, `events`, `metrics`, `limits`, `serialization`).

pub mod config;
pub mod contracts;
pub mod engine;
pub mod errors;
pub mod events;
pub mod graph;
pub mod limits;
pub mod metrics;
pub mod search;
pub mod serialization;
pub mod spans;
pub mod thought;

pub use config::GraphConfig;
pub use contracts::{Evaluator, Generator, GoalPredicate, SearchContext, Verifier, VerificationOutcome};
pub use engine::ExpansionEngine;
pub use errors::{GraphError, Result};
pub use events::{EventEmitter, EventType, GraphEvent};
pub use graph::{Graph, GraphStats};
pub use limits::ResourceLimiter;
pub use metrics::MetricsCollector;
pub use search::{SearchConfig, SearchResult, TerminationReason};
pub use thought::{Edge, Thought, ThoughtStatus};
