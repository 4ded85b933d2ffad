//! Iterative deepening: repeated depth-limited DFS passes with the depth
//! limit increasing by one each time, reusing whatever the graph already
//! holds from the previous pass as a cache (a `COMPLETED` thought is not
//! re-expanded).

use std::collections::HashSet;

use crate::contracts::GoalPredicate;
use crate::engine::ExpansionEngine;
use crate::errors::Result;
use crate::events::GraphEvent;
use crate::graph::Graph;
use crate::thought::{Thought, ThoughtStatus};

use super::{Budget, SearchConfig, SearchResult, TerminationReason};

#[tracing::instrument(skip_all)]
pub async fn iterative_deepening_search<T>(
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
    events.emit(GraphEvent::search_started("iterative_deepening")).await;

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
    let mut explored: HashSet<String> = HashSet::new();
    let mut best_id = start_ids[0].clone();
    let mut best_score = f64::NEG_INFINITY;

    let reason = 'outer: loop {
        let mut reached_final_depth = false;
        for depth_limit in 1..=config.max_depth {
            reached_final_depth = depth_limit == config.max_depth;
            let mut stack: Vec<String> = start_ids.iter().rev().cloned().collect();
            let mut visited_this_pass: HashSet<String> = HashSet::new();

            while let Some(id) = stack.pop() {
                if budget.timed_out() {
                    break 'outer TerminationReason::Timeout;
                }
                if !visited_this_pass.insert(id.clone()) {
                    continue;
                }

                let thought = graph.get_thought(&id)?.clone();
                explored.insert(id.clone());
                if thought.score > best_score {
                    best_score = thought.score;
                    best_id = id.clone();
                }

                if goal.as_ref().is_some_and(|g| g(&thought.content)) {
                    events.emit(GraphEvent::goal_reached(thought.clone())).await;
                    best_id = id.clone();
                    break 'outer TerminationReason::GoalReached;
                }

                let eligible = thought.depth < depth_limit
                    && thought.status != ThoughtStatus::Completed
                    && thought.status != ThoughtStatus::Pruned;

                if eligible {
                    if budget.expansions_exhausted() {
                        break 'outer TerminationReason::MaxExpansions;
                    }
                    let children: Vec<Thought<T>> = engine.expand(graph, &id).await?;
                    budget.record_expansion(children.iter().map(|c| c.tokens_used).sum());
                    if budget.budget_exhausted() {
                        for child in &children {
                            explored.insert(child.id.clone());
                        }
                        break 'outer TerminationReason::BudgetExhausted;
                    }
                    for child in children.into_iter().rev() {
                        stack.push(child.id);
                    }
                } else if thought.depth < depth_limit {
                    // Already completed/pruned: push its existing children so
                    // the DFS still walks into cached subtrees.
                    if let Ok(children) = graph.get_children(&id) {
                        for child in children.into_iter().rev() {
                            stack.push(child.id.clone());
                        }
                    }
                }
            }
        }

        if reached_final_depth {
            break TerminationReason::Completed;
        }
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
    tracing::debug!(reason = %result.termination_reason, thoughts_expanded = result.thoughts_expanded, "iterative_deepening_search finished");
    events
        .emit(GraphEvent::search_completed(result.termination_reason.as_str()))
        .await;
    Ok(result)
}
