//! Expansion engine: the single place that turns one thought into its
//! children by calling out to a generator and evaluator and committing the
//! results to a [`Graph`].
//!
//! Search strategies never touch the generator/evaluator directly — they
//! all drive this one `expand` operation, so every mutation of the graph
//! goes through a single seam.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::contracts::{Evaluator, Generator, SearchContext};
use crate::errors::Result;
use crate::events::{EventEmitter, GraphEvent, NullEventEmitter};
use crate::graph::Graph;
use crate::metrics::{InMemoryMetricsCollector, MetricsCollector};
use crate::thought::{Thought, ThoughtStatus};

pub struct ExpansionEngine<T> {
    generator: Arc<dyn Generator<T>>,
    evaluator: Arc<dyn Evaluator<T>>,
    events: Arc<dyn EventEmitter<T>>,
    metrics: Arc<dyn MetricsCollector>,
}

impl<T: Send + Sync + Clone + 'static> ExpansionEngine<T> {
    pub fn new(generator: Arc<dyn Generator<T>>, evaluator: Arc<dyn Evaluator<T>>) -> Self {
        Self {
            generator,
            evaluator,
            events: Arc::new(NullEventEmitter),
            metrics: Arc::new(InMemoryMetricsCollector::new()),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventEmitter<T>>) -> Self {
        self.events = events;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn events(&self) -> Arc<dyn EventEmitter<T>> {
        self.events.clone()
    }

    pub fn metrics(&self) -> Arc<dyn MetricsCollector> {
        self.metrics.clone()
    }

    /// Expand `thought_id` in `graph`: generate children, score each, and
    /// install them as new thoughts. Returns the newly-created children in
    /// generator order.
    ///
    /// Depth limits and the `PRUNED`/`COMPLETED` idempotence rule are
    /// checked before anything is invoked; a generator failure is caught
    /// and turned into a `FAILED` status rather than propagated, matching
    /// the error-recovery table (`GenerationError` is swallowed here, not
    /// at the strategy layer).
    #[tracing::instrument(skip(self, graph), fields(depth))]
    pub async fn expand(&self, graph: &mut Graph<T>, thought_id: &str) -> Result<Vec<Thought<T>>> {
        let max_depth = graph.config().limits.max_depth;
        let thought = graph.get_thought(thought_id)?.clone();
        tracing::Span::current().record("depth", thought.depth);

        if thought.depth >= max_depth {
            tracing::debug!(thought_id, max_depth, "expansion skipped: max depth reached");
            return Ok(Vec::new());
        }
        if matches!(thought.status, ThoughtStatus::Pruned | ThoughtStatus::Completed) {
            tracing::debug!(thought_id, status = ?thought.status, "expansion skipped: terminal status");
            return Ok(Vec::new());
        }

        graph.get_thought_mut(thought_id)?.status = ThoughtStatus::Active;

        let path_to_root = graph
            .get_path_to_root(thought_id)?
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        let ctx = SearchContext::new(thought.clone(), path_to_root);

        let gen_start = Instant::now();
        let generated = {
            let span = crate::generation_span!(thought_id);
            self.generator.generate(&thought.content, &ctx).instrument(span).await
        };
        let generation_ms = gen_start.elapsed().as_secs_f64() * 1000.0;
        self.metrics.histogram("thought.generation_ms", generation_ms);

        let contents = match generated {
            Ok(contents) => contents,
            Err(message) => {
                tracing::warn!(thought_id, message = %message, "generation failed");
                graph.get_thought_mut(thought_id)?.status = ThoughtStatus::Failed;
                let failed = graph.get_thought(thought_id)?.clone();
                self.events
                    .emit(GraphEvent::thought_failed(failed, message))
                    .await;
                return Ok(Vec::new());
            }
        };

        let mut children = Vec::with_capacity(contents.len());
        for content in contents {
            let eval_start = Instant::now();
            let score = {
                let span = crate::evaluation_span!(thought_id);
                match self.evaluator.evaluate(&content, &ctx).instrument(span).await {
                    Ok(score) => score,
                    Err(message) => {
                        tracing::warn!(thought_id, message = %message, "evaluation failed, substituting 0.0");
                        self.metrics.increment("evaluation.error", 1);
                        0.0
                    }
                }
            };
            let evaluation_ms = eval_start.elapsed().as_secs_f64() * 1000.0;
            self.metrics.histogram("thought.evaluation_ms", evaluation_ms);
            let tokens_used = self.generator.token_cost(&content);

            // `THOUGHT_ADDED` is published by `Graph::add_thought` itself
            // (wire the same emitter into the graph via `with_events` to
            // see it here), so children don't need a second emit on top of
            // the graph's.
            let child = graph
                .add_thought(
                    content,
                    Some(thought_id),
                    None,
                    1.0,
                    Some(score),
                    None,
                    tokens_used,
                    generation_ms,
                    Default::default(),
                )?
                .clone();
            children.push(child);
        }

        graph.get_thought_mut(thought_id)?.status = ThoughtStatus::Completed;
        let parent = graph.get_thought(thought_id)?.clone();
        self.events
            .emit(GraphEvent::thought_expanded(parent, children.len()))
            .await;
        self.metrics.increment("thoughts.expanded", 1);
        self.metrics
            .histogram("expansion.children_count", children.len() as f64);

        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::contracts::{ConstantEvaluator, FnGenerator};

    fn engine() -> ExpansionEngine<String> {
        let generator = Arc::new(FnGenerator::new(|s: &String| vec![format!("{s}a"), format!("{s}b")]));
        let evaluator = Arc::new(ConstantEvaluator(0.5));
        ExpansionEngine::new(generator, evaluator)
    }

    #[tokio::test]
    async fn expand_creates_children_in_generator_order() {
        let mut graph = Graph::new(GraphConfig::default());
        let root_id = graph
            .add_thought("root".into(), None, None, 1.0, None, Some("root".into()), 0, 0.0, Default::default())
            .unwrap()
            .id
            .clone();

        let children = engine().expand(&mut graph, &root_id).await.unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].content, "roota");
        assert_eq!(children[1].content, "rootb");
        assert_eq!(graph.get_thought(&root_id).unwrap().status, ThoughtStatus::Completed);
    }

    #[tokio::test]
    async fn expand_returns_empty_at_max_depth() {
        let mut config = GraphConfig::default();
        config.limits.max_depth = 0;
        let mut graph = Graph::new(config);
        let root_id = graph
            .add_thought("root".into(), None, None, 1.0, None, Some("root".into()), 0, 0.0, Default::default())
            .unwrap()
            .id
            .clone();
        let children = engine().expand(&mut graph, &root_id).await.unwrap();
        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn expand_returns_empty_for_pruned_thought() {
        let mut graph = Graph::new(GraphConfig::default());
        let root_id = graph
            .add_thought("root".into(), None, None, 1.0, None, Some("root".into()), 0, 0.0, Default::default())
            .unwrap()
            .id
            .clone();
        graph.get_thought_mut(&root_id).unwrap().status = ThoughtStatus::Pruned;
        let children = engine().expand(&mut graph, &root_id).await.unwrap();
        assert!(children.is_empty());
    }

    #[tokio::test]
    async fn generator_failure_marks_thought_failed_and_returns_empty() {
        struct AlwaysFails;
        #[async_trait::async_trait]
        impl Generator<String> for AlwaysFails {
            async fn generate(&self, _parent_content: &String, _ctx: &SearchContext<String>) -> std::result::Result<Vec<String>, String> {
                Err("boom".to_string())
            }
        }

        let engine = ExpansionEngine::new(Arc::new(AlwaysFails), Arc::new(ConstantEvaluator(0.0)));
        let mut graph = Graph::new(GraphConfig::default());
        let root_id = graph
            .add_thought("root".into(), None, None, 1.0, None, Some("root".into()), 0, 0.0, Default::default())
            .unwrap()
            .id
            .clone();
        let children = engine.expand(&mut graph, &root_id).await.unwrap();
        assert!(children.is_empty());
        assert_eq!(graph.get_thought(&root_id).unwrap().status, ThoughtStatus::Failed);
    }

    #[tokio::test]
    async fn evaluator_failure_substitutes_zero_score() {
        struct AlwaysFails;
        #[async_trait::async_trait]
        impl Evaluator<String> for AlwaysFails {
            async fn evaluate(&self, _content: &String, _ctx: &SearchContext<String>) -> std::result::Result<f64, String> {
                Err("boom".to_string())
            }
        }

        let generator = Arc::new(FnGenerator::new(|s: &String| vec![format!("{s}a")]));
        let engine = ExpansionEngine::new(generator, Arc::new(AlwaysFails));
        let mut graph = Graph::new(GraphConfig::default());
        let root_id = graph
            .add_thought("root".into(), None, None, 1.0, None, Some("root".into()), 0, 0.0, Default::default())
            .unwrap()
            .id
            .clone();
        let children = engine.expand(&mut graph, &root_id).await.unwrap();
        assert_eq!(children[0].score, 0.0);
    }
}
