//! Best-first search: a priority queue over thoughts ordered by descending
//! score, ties broken by insertion order (earliest inserted wins). A
//! monotonic counter rides alongside each entry so `f64` scores can be
//! compared without violating a total order.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::contracts::GoalPredicate;
use crate::engine::ExpansionEngine;
use crate::errors::Result;
use crate::events::GraphEvent;
use crate::graph::Graph;
use crate::thought::{Thought, ThoughtStatus};

use super::{Budget, SearchConfig, SearchResult, TerminationReason};

struct QueueItem {
    score: f64,
    seq: u64,
    id: String,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.seq == other.seq
    }
}
impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[tracing::instrument(skip_all)]
pub async fn best_first_search<T>(
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
    events.emit(GraphEvent::search_started("best_first")).await;

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
    let mut seq: u64 = 0;
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::new();
    let mut explored: HashSet<String> = HashSet::new();
    let mut expanded_ids: HashSet<String> = HashSet::new();
    let mut best_id = start_ids[0].clone();
    let mut best_score = f64::NEG_INFINITY;

    for id in &start_ids {
        let thought = graph.get_thought(id)?;
        queue.push(QueueItem { score: thought.score, seq, id: id.clone() });
        seq += 1;
        explored.insert(id.clone());
    }

    let reason;
    loop {
        if budget.timed_out() {
            reason = TerminationReason::Timeout;
            break;
        }

        let current_id = loop {
            match queue.pop() {
                Some(item) if expanded_ids.contains(&item.id) => continue,
                Some(item) => break Some(item.id),
                None => break None,
            }
        };
        let Some(current_id) = current_id else {
            reason = TerminationReason::Completed;
            break;
        };

        let current = graph.get_thought(&current_id)?.clone();
        if current.score > best_score {
            best_score = current.score;
            best_id = current.id.clone();
        }

        if goal.as_ref().is_some_and(|g| g(&current.content)) {
            best_id = current.id.clone();
            events.emit(GraphEvent::goal_reached(current.clone())).await;
            reason = TerminationReason::GoalReached;
            break;
        }

        if budget.expansions_exhausted() {
            reason = TerminationReason::MaxExpansions;
            break;
        }
        if current.status == ThoughtStatus::Pruned || current.depth >= config.max_depth {
            expanded_ids.insert(current_id);
            continue;
        }

        let children: Vec<Thought<T>> = engine.expand(graph, &current_id).await?;
        expanded_ids.insert(current_id);
        budget.record_expansion(children.iter().map(|c| c.tokens_used).sum());

        for child in &children {
            explored.insert(child.id.clone());
            queue.push(QueueItem { score: child.score, seq, id: child.id.clone() });
            seq += 1;
        }

        if budget.budget_exhausted() {
            reason = TerminationReason::BudgetExhausted;
            break;
        }
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
    tracing::debug!(reason = %result.termination_reason, thoughts_expanded = result.thoughts_expanded, "best_first_search finished");
    events
        .emit(GraphEvent::search_completed(result.termination_reason.as_str()))
        .await;
    Ok(result)
}
