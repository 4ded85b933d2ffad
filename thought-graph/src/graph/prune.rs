//! Merge and prune operations.
//!
//! Status-driven rather than a straight threshold sweep and delete: pruning
//! marks status rather than unconditionally removing the node, and merging
//! synthesizes a new thought rather than collapsing nodes in place.

use std::collections::HashMap;

use crate::errors::{GraphError, Result};
use crate::thought::{Thought, ThoughtStatus, RELATION_MERGES_INTO};

use super::store::Graph;

impl<T> Graph<T> {
    /// Merge multiple existing thoughts into one new synthesized thought.
    /// Each source is linked to the new node via `merges_into` and marked
    /// `MERGED`. The new thought's depth is `1 + max(depth(sources))`.
    pub fn merge_thoughts(
        &mut self,
        thought_ids: &[String],
        merged_content: T,
        relation: Option<&str>,
        weight: f64,
        score: Option<f64>,
    ) -> Result<&Thought<T>> {
        if thought_ids.is_empty() {
            return Err(GraphError::graph("cannot merge an empty list of thoughts"));
        }

        let mut max_depth = 0;
        for id in thought_ids {
            max_depth = max_depth.max(self.get_thought(id)?.depth);
        }

        let merged_id = uuid::Uuid::new_v4().simple().to_string();
        let mut merged = Thought::new(merged_id.clone(), merged_content, max_depth + 1);
        merged.score = score.unwrap_or(0.0);
        let idx = self.inner.add_node(merged);
        self.index.insert(merged_id.clone(), idx);

        let relation = relation.unwrap_or(RELATION_MERGES_INTO);
        for id in thought_ids {
            self.add_edge(id, &merged_id, Some(relation), weight, HashMap::new())?;
            self.get_thought_mut(id)?.status = ThoughtStatus::Merged;
        }

        self.metrics.increment("thoughts.merged", 1);
        Ok(&self.inner[idx])
    }

    /// Mark every `PENDING` thought scoring below `threshold` as `PRUNED`.
    /// Returns the number pruned.
    pub fn prune(&mut self, threshold: f64) -> usize {
        let mut count = 0;
        for thought in self.inner.node_weights_mut() {
            if thought.status == ThoughtStatus::Pending && thought.score < threshold {
                thought.status = ThoughtStatus::Pruned;
                count += 1;
            }
        }
        self.metrics.increment("thoughts.pruned", count as u64);
        count
    }

    /// As [`Graph::prune`], but additionally removes the pruned thoughts
    /// from the graph entirely.
    pub fn prune_and_remove(&mut self, threshold: f64) -> usize {
        let to_remove: Vec<String> = self
            .inner
            .node_weights()
            .filter(|t| t.status == ThoughtStatus::Pending && t.score < threshold)
            .map(|t| t.id.clone())
            .collect();

        for id in &to_remove {
            let _ = self.remove_thought(id);
        }

        to_remove.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;

    fn graph() -> Graph<String> {
        Graph::new(GraphConfig::default())
    }

    #[test]
    fn prune_only_affects_pending_below_threshold() {
        let mut g = graph();
        g.add_thought("a".into(), None, None, 1.0, Some(0.1), Some("a".into()), 0, 0.0, HashMap::new()).unwrap();
        g.add_thought("b".into(), None, None, 1.0, Some(0.9), Some("b".into()), 0, 0.0, HashMap::new()).unwrap();
        let pruned = g.prune(0.5);
        assert_eq!(pruned, 1);
        assert_eq!(g.get_thought("a").unwrap().status, ThoughtStatus::Pruned);
        assert_eq!(g.get_thought("b").unwrap().status, ThoughtStatus::Pending);
    }

    #[test]
    fn prune_leaves_non_pending_statuses_untouched() {
        let mut g = graph();
        g.add_thought("a".into(), None, None, 1.0, Some(0.0), Some("a".into()), 0, 0.0, HashMap::new()).unwrap();
        g.get_thought_mut("a").unwrap().status = ThoughtStatus::Completed;
        let pruned = g.prune(0.5);
        assert_eq!(pruned, 0);
        assert_eq!(g.get_thought("a").unwrap().status, ThoughtStatus::Completed);
    }

    #[test]
    fn prune_and_remove_deletes_from_graph() {
        let mut g = graph();
        g.add_thought("a".into(), None, None, 1.0, Some(0.1), Some("a".into()), 0, 0.0, HashMap::new()).unwrap();
        let removed = g.prune_and_remove(0.5);
        assert_eq!(removed, 1);
        assert!(!g.contains("a"));
    }

    #[test]
    fn merge_marks_sources_merged_and_sets_depth() {
        let mut g = graph();
        g.add_thought("a".into(), None, None, 1.0, None, Some("a".into()), 0, 0.0, HashMap::new()).unwrap();
        g.add_thought("b".into(), Some("a"), None, 1.0, None, Some("b".into()), 0, 0.0, HashMap::new()).unwrap();
        let merged_id = g
            .merge_thoughts(&["a".to_string(), "b".to_string()], "synthesis".into(), None, 1.0, Some(0.7))
            .unwrap()
            .id
            .clone();
        assert_eq!(g.get_thought("a").unwrap().status, ThoughtStatus::Merged);
        assert_eq!(g.get_thought("b").unwrap().status, ThoughtStatus::Merged);
        assert_eq!(g.get_thought(&merged_id).unwrap().depth, 2);
    }

    #[test]
    fn merge_empty_list_is_an_error() {
        let mut g = graph();
        assert!(g.merge_thoughts(&[], "x".into(), None, 1.0, None).is_err());
    }
}
