//! Beam search: keep the `beam_width` best thoughts seen so far at each
//! step, expanding everyone in the beam and folding the union of their
//! children back down to size before the next step.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::contracts::GoalPredicate;
use crate::engine::ExpansionEngine;
use crate::errors::Result;
use crate::events::GraphEvent;
use crate::graph::Graph;
use crate::thought::{Thought, ThoughtStatus};

use super::{Budget, SearchConfig, SearchResult, TerminationReason};

#[tracing::instrument(skip_all)]
pub async fn beam_search<T>(
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
    events.emit(GraphEvent::search_started("beam")).await;

    let mut beam: Vec<String> = match start {
        Some(ids) => ids.to_vec(),
        None => graph.root_ids().to_vec(),
    };

    if beam.is_empty() {
        let result = SearchResult::empty(TerminationReason::NoRoots, 0.0);
        events
            .emit(GraphEvent::search_completed(result.termination_reason.as_str()))
            .await;
        return Ok(result);
    }

    let mut budget = Budget::new(config);
    let mut explored: HashSet<String> = HashSet::new();
    let mut expanded_ids: HashSet<String> = HashSet::new();
    let mut best_id = beam[0].clone();
    let mut best_score = f64::NEG_INFINITY;

    for id in &beam {
        explored.insert(id.clone());
        let thought = graph.get_thought(id)?;
        if thought.score > best_score {
            best_score = thought.score;
            best_id = id.clone();
        }
    }

    let reason;
    'outer: loop {
        if budget.timed_out() {
            reason = TerminationReason::Timeout;
            break;
        }

        for id in &beam {
            let thought = graph.get_thought(id)?.clone();
            if goal.as_ref().is_some_and(|g| g(&thought.content)) {
                best_id = thought.id.clone();
                events.emit(GraphEvent::goal_reached(thought)).await;
                reason = TerminationReason::GoalReached;
                break 'outer;
            }
        }

        if budget.expansions_exhausted() {
            reason = TerminationReason::MaxExpansions;
            break;
        }

        let mut union: Vec<Thought<T>> = Vec::new();
        for id in beam.clone() {
            let thought = graph.get_thought(&id)?.clone();
            if expanded_ids.contains(&id)
                || thought.status == ThoughtStatus::Pruned
                || thought.depth >= config.max_depth
            {
                continue;
            }
            let children = engine.expand(graph, &id).await?;
            expanded_ids.insert(id);
            budget.record_expansion(children.iter().map(|c| c.tokens_used).sum());

            for child in children {
                explored.insert(child.id.clone());
                if child.score > best_score {
                    best_score = child.score;
                    best_id = child.id.clone();
                }
                union.push(child);
            }
        }

        if budget.budget_exhausted() {
            reason = TerminationReason::BudgetExhausted;
            break;
        }
        if union.is_empty() {
            reason = TerminationReason::Completed;
            break;
        }

        union.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        union.truncate(config.beam_width);
        beam = union.into_iter().map(|t| t.id).collect();
    }

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
    tracing::debug!(reason = %result.termination_reason, thoughts_expanded = result.thoughts_expanded, "beam_search finished");
    events
        .emit(GraphEvent::search_completed(result.termination_reason.as_str()))
        .await;
    Ok(result)
}
