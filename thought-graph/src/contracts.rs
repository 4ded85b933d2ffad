//! Generator / Evaluator / Verifier contracts and the search context passed
//! to them.
//!
//! These are the seams an LLM integration (out of scope for this crate)
//! hangs off. All three are async to allow a real implementation to make a
//! network call without blocking the expansion engine's single-task
//! scheduling loop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::thought::Thought;

/// Immutable snapshot passed into generator/evaluator/verifier calls.
/// Recomputed by the caller (engine or strategy) at each expansion site;
/// never mutated in place.
#[derive(Debug, Clone)]
pub struct SearchContext<T> {
    pub current_thought: Thought<T>,
    pub path_to_root: Vec<Thought<T>>,
    pub depth: u32,
    pub tokens_remaining: Option<u64>,
    pub time_remaining_seconds: Option<f64>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<T> SearchContext<T> {
    pub fn new(current_thought: Thought<T>, path_to_root: Vec<Thought<T>>) -> Self {
        let depth = current_thought.depth;
        Self {
            current_thought,
            path_to_root,
            depth,
            tokens_remaining: None,
            time_remaining_seconds: None,
            metadata: HashMap::new(),
        }
    }
}

/// Produces candidate child contents from a parent's content. Order of the
/// returned sequence is preserved and becomes insertion order in the graph.
#[async_trait]
pub trait Generator<T>: Send + Sync {
    async fn generate(&self, parent_content: &T, ctx: &SearchContext<T>) -> Result<Vec<T>, String>;

    /// Token cost attributed to one generated child, charged against the
    /// search's token budget. Defaults to zero; a real model-backed
    /// generator overrides this with whatever the provider billed for that
    /// piece of content.
    fn token_cost(&self, _content: &T) -> u64 {
        0
    }
}

/// Scores a piece of content. A failure is caught by the expansion engine,
/// which substitutes `0.0` and continues.
#[async_trait]
pub trait Evaluator<T>: Send + Sync {
    async fn evaluate(&self, content: &T, ctx: &SearchContext<T>) -> Result<f64, String>;
}

/// Optional acceptance gate for newly generated content. When absent,
/// children are unconditionally accepted.
#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub is_valid: bool,
    pub confidence: f64,
    pub issues: Vec<String>,
}

#[async_trait]
pub trait Verifier<T>: Send + Sync {
    async fn verify(&self, content: &T, ctx: &SearchContext<T>) -> Result<VerificationOutcome, String>;
}

/// Adapts a plain synchronous-in-spirit closure into a [`Generator`], for
/// callers that do not need the full context.
pub struct FnGenerator<F> {
    func: F,
}

impl<F> FnGenerator<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<T, F> Generator<T> for FnGenerator<F>
where
    T: Send + Sync,
    F: Fn(&T) -> Vec<T> + Send + Sync,
{
    async fn generate(&self, parent_content: &T, _ctx: &SearchContext<T>) -> Result<Vec<T>, String> {
        Ok((self.func)(parent_content))
    }
}

/// Adapts a plain synchronous-in-spirit closure into an [`Evaluator`].
pub struct FnEvaluator<F> {
    func: F,
}

impl<F> FnEvaluator<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<T, F> Evaluator<T> for FnEvaluator<F>
where
    T: Send + Sync,
    F: Fn(&T) -> f64 + Send + Sync,
{
    async fn evaluate(&self, content: &T, _ctx: &SearchContext<T>) -> Result<f64, String> {
        Ok((self.func)(content))
    }
}

/// An evaluator that always returns the same score, for smoke tests and
/// default wiring.
pub struct ConstantEvaluator(pub f64);

#[async_trait]
impl<T: Send + Sync> Evaluator<T> for ConstantEvaluator {
    async fn evaluate(&self, _content: &T, _ctx: &SearchContext<T>) -> Result<f64, String> {
        Ok(self.0)
    }
}

pub type GoalPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thought::Thought;

    fn ctx() -> SearchContext<String> {
        SearchContext::new(Thought::new("root", "x".to_string(), 0), vec![])
    }

    #[tokio::test]
    async fn fn_generator_wraps_closure() {
        let gen = FnGenerator::new(|s: &String| vec![format!("{s}a"), format!("{s}b")]);
        let children = gen.generate(&"x".to_string(), &ctx()).await.unwrap();
        assert_eq!(children, vec!["xa".to_string(), "xb".to_string()]);
    }

    #[tokio::test]
    async fn constant_evaluator_ignores_content() {
        let eval = ConstantEvaluator(0.42);
        assert_eq!(eval.evaluate(&"anything".to_string(), &ctx()).await.unwrap(), 0.42);
    }
}
