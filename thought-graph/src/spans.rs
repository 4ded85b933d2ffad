//! Span definitions for the two calls the expansion engine makes out to
//! host-provided code: generation and evaluation. Expansion and search
//! themselves get their spans from `#[tracing::instrument]` directly, since
//! nothing needs to build their span by hand.
//!
//! Each span carries the identifiers useful for correlating a trace with a
//! specific thought or search run, via the `tracing` crate.

/// Create a generation span.
#[macro_export]
macro_rules! generation_span {
    ($thought_id:expr) => {
        tracing::info_span!("thought_graph.generation", thought_id = %$thought_id)
    };
}

/// Create an evaluation span.
#[macro_export]
macro_rules! evaluation_span {
    ($thought_id:expr) => {
        tracing::info_span!("thought_graph.evaluation", thought_id = %$thought_id)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const GENERATION: &str = "thought_graph.generation";
    pub const EVALUATION: &str = "thought_graph.evaluation";
}
