//! Monte Carlo Tree Search over UCB1, with a root-ensemble to cover
//! multi-root graphs: one tree is seeded per root and each iteration picks
//! the root-ensemble member with the highest UCB1 before descending, rather
//! than wrapping them in a single synthetic root node.

use rand::seq::SliceRandom;

use crate::contracts::GoalPredicate;
use crate::engine::ExpansionEngine;
use crate::errors::Result;
use crate::events::GraphEvent;
use crate::graph::Graph;
use crate::thought::Thought;

use super::{Budget, SearchConfig, SearchResult, TerminationReason};

const EXPLORATION_CONSTANT: f64 = std::f64::consts::SQRT_2;

struct MctsNode {
    thought_id: String,
    visits: u64,
    total_score: f64,
    is_expanded: bool,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl MctsNode {
    fn average_score(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_score / self.visits as f64
        }
    }
}

fn ucb1(node: &MctsNode, parent_visits: u64) -> f64 {
    if node.visits == 0 {
        return f64::INFINITY;
    }
    node.average_score()
        + EXPLORATION_CONSTANT * ((parent_visits as f64).ln() / node.visits as f64).sqrt()
}

#[tracing::instrument(skip_all)]
pub async fn mcts_search<T>(
    graph: &mut Graph<T>,
    engine: &ExpansionEngine<T>,
    config: &SearchConfig,
    start: Option<&[String]>,
    goal: Option<&GoalPredicate<T>>,
) -> Result<SearchResult<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let events = engine.events();
    events.emit(GraphEvent::search_started("mcts")).await;

    let start_ids: Vec<String> = match start {
        Some(ids) => ids.to_vec(),
        None => graph.root_ids().to_vec(),
    };

    if start_ids.is_empty() {
        let result = SearchResult::empty(TerminationReason::NoRoots, 0.0);
        events
            .emit(GraphEvent::search_completed(result.termination_reason.as_str()))
            .await;
        return Ok(result);
    }

    let mut budget = Budget::new(config);
    let mut arena: Vec<MctsNode> = Vec::new();
    let mut root_indices: Vec<usize> = Vec::new();
    let mut explored = std::collections::HashSet::new();
    let mut best_id = start_ids[0].clone();
    let mut best_score = f64::NEG_INFINITY;

    for id in &start_ids {
        explored.insert(id.clone());
        let score = graph.get_thought(id)?.score;
        if score > best_score {
            best_score = score;
            best_id = id.clone();
        }
        root_indices.push(arena.len());
        arena.push(MctsNode {
            thought_id: id.clone(),
            visits: 0,
            total_score: 0.0,
            is_expanded: false,
            parent: None,
            children: Vec::new(),
        });
    }

    let mut rng = rand::thread_rng();

    let reason = 'outer: loop {
        if budget.timed_out() {
            break TerminationReason::Timeout;
        }
        if budget.expansions_exhausted() {
            break TerminationReason::MaxExpansions;
        }
        if !any_expandable(graph, &arena, config.max_depth)? {
            break TerminationReason::Completed;
        }

        // Select the root-ensemble member with the highest UCB1, breaking
        // ties toward unvisited roots first.
        let root_visits_total: u64 = root_indices.iter().map(|&i| arena[i].visits).sum();
        let mut current = *root_indices
            .iter()
            .max_by(|&&a, &&b| {
                ucb1(&arena[a], root_visits_total.max(1))
                    .partial_cmp(&ucb1(&arena[b], root_visits_total.max(1)))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .expect("root_indices is non-empty");

        while arena[current].is_expanded && !arena[current].children.is_empty() {
            let parent_visits = arena[current].visits.max(1);
            current = *arena[current]
                .children
                .iter()
                .max_by(|&&a, &&b| {
                    ucb1(&arena[a], parent_visits)
                        .partial_cmp(&ucb1(&arena[b], parent_visits))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .expect("is_expanded implies children is non-empty");
        }

        let selected_thought = graph.get_thought(&arena[current].thought_id)?.clone();
        if selected_thought.score > best_score {
            best_score = selected_thought.score;
            best_id = selected_thought.id.clone();
        }
        if goal.as_ref().is_some_and(|g| g(&selected_thought.content)) {
            events.emit(GraphEvent::goal_reached(selected_thought.clone())).await;
            best_id = selected_thought.id.clone();
            break TerminationReason::GoalReached;
        }

        let mut rollout_score = selected_thought.score;

        if !arena[current].is_expanded && selected_thought.depth < config.max_depth {
            let children: Vec<Thought<T>> = engine.expand(graph, &selected_thought.id).await?;
            budget.record_expansion(children.iter().map(|c| c.tokens_used).sum());
            arena[current].is_expanded = true;

            for child in &children {
                explored.insert(child.id.clone());
                if child.score > best_score {
                    best_score = child.score;
                    best_id = child.id.clone();
                }
                let child_idx = arena.len();
                arena.push(MctsNode {
                    thought_id: child.id.clone(),
                    visits: 0,
                    total_score: 0.0,
                    is_expanded: false,
                    parent: Some(current),
                    children: Vec::new(),
                });
                arena[current].children.push(child_idx);
            }

            if budget.budget_exhausted() {
                backpropagate(&mut arena, current, rollout_score);
                break 'outer TerminationReason::BudgetExhausted;
            }

            if let Some(child) = children.choose(&mut rng) {
                rollout_score = child.score;
            }
        } else {
            arena[current].is_expanded = true;
        }

        backpropagate(&mut arena, current, rollout_score);
    };

    let best_path: Vec<Thought<T>> = graph
        .get_path_to_root(&best_id)?
        .into_iter()
        .cloned()
        .collect();

    let result = SearchResult {
        best_path,
        best_score,
        thoughts_explored: explored.len(),
        thoughts_expanded: budget.expansions(),
        total_tokens_used: budget.tokens_used(),
        wall_time_seconds: budget.wall_time_seconds(),
        termination_reason: reason,
        metadata: Default::default(),
    };
    tracing::debug!(reason = %result.termination_reason, thoughts_expanded = result.thoughts_expanded, "mcts_search finished");
    events
        .emit(GraphEvent::search_completed(result.termination_reason.as_str()))
        .await;
    Ok(result)
}

fn backpropagate(arena: &mut [MctsNode], start: usize, score: f64) {
    let mut cursor = Some(start);
    while let Some(idx) = cursor {
        arena[idx].visits += 1;
        arena[idx].total_score += score;
        cursor = arena[idx].parent;
    }
}

fn any_expandable<T>(graph: &Graph<T>, arena: &[MctsNode], max_depth: u32) -> Result<bool> {
    for node in arena {
        if node.is_expanded {
            continue;
        }
        if graph.get_thought(&node.thought_id)?.depth < max_depth {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::contracts::{ConstantEvaluator, FnEvaluator, FnGenerator};
    use std::sync::Arc;

    #[tokio::test]
    async fn empty_graph_reports_no_roots() {
        let mut graph = Graph::<String>::new(GraphConfig::default());
        let generator = Arc::new(FnGenerator::new(|s: &String| vec![format!("{s}a")]));
        let evaluator = Arc::new(ConstantEvaluator(0.0));
        let engine = ExpansionEngine::new(generator, evaluator);
        let config = SearchConfig::from_graph_config(graph.config());
        let result = mcts_search(&mut graph, &engine, &config, None, None).await.unwrap();
        assert_eq!(result.termination_reason, TerminationReason::NoRoots);
    }

    #[tokio::test]
    async fn visits_only_increase_monotonically_through_backpropagation() {
        let mut graph = Graph::<String>::new(GraphConfig::default());
        graph
            .add_thought("x".into(), None, None, 1.0, Some(0.0), Some("x".into()), 0, 0.0, Default::default())
            .unwrap();
        let generator = Arc::new(FnGenerator::new(|s: &String| vec![format!("{s}a"), format!("{s}b")]));
        let evaluator = Arc::new(FnEvaluator::new(|s: &String| s.len() as f64));
        let engine = ExpansionEngine::new(generator, evaluator);
        let config = SearchConfig {
            max_depth: 3,
            beam_width: 2,
            max_expansions: 30,
            max_tokens: None,
            timeout_seconds: None,
            score_threshold: 0.0,
        };

        let result = mcts_search(&mut graph, &engine, &config, None, None).await.unwrap();
        assert!(matches!(
            result.termination_reason,
            TerminationReason::MaxExpansions | TerminationReason::Completed
        ));
        assert!(result.thoughts_expanded > 0);
        assert!(!result.best_path.is_empty());
    }
}
