//! Supplemental presentation helpers ported from the original Python
//! `GraphOfThought.visualize`/`.stats` — pure reads over existing graph
//! state, no new invariants.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use crate::thought::ThoughtStatus;

use super::store::Graph;

#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    pub total_thoughts: usize,
    pub total_edges: usize,
    pub root_count: usize,
    pub leaf_count: usize,
    pub max_depth: u32,
    pub avg_score: f64,
    pub status_counts: HashMap<&'static str, usize>,
}

impl<T> Graph<T> {
    pub fn stats(&self) -> GraphStats {
        let mut status_counts: HashMap<&'static str, usize> = HashMap::new();
        let mut max_depth = 0;
        let mut score_sum = 0.0;
        let count = self.inner.node_count();

        for thought in self.inner.node_weights() {
            *status_counts.entry(thought.status.as_str()).or_insert(0) += 1;
            max_depth = max_depth.max(thought.depth);
            score_sum += thought.score;
        }

        GraphStats {
            total_thoughts: count,
            total_edges: self.inner.edge_count(),
            root_count: self.root_ids.len(),
            leaf_count: self.get_leaves(false).len(),
            max_depth,
            avg_score: if count > 0 { score_sum / count as f64 } else { 0.0 },
            status_counts,
        }
    }

    /// Render the graph as an indented text tree, mirroring the reference
    /// implementation's status icons, truncated content, and
    /// cycle/back-reference markers.
    pub fn render_tree(&self, max_content_length: usize) -> String
    where
        T: std::fmt::Display,
    {
        let mut lines = vec!["Graph of Thought".to_string(), "=".repeat(40)];
        let mut visited_in_tree: HashSet<String> = HashSet::new();

        for (i, root_id) in self.root_ids.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            self.render_node(
                root_id,
                "",
                i == self.root_ids.len() - 1,
                &mut HashSet::new(),
                &mut visited_in_tree,
                &mut lines,
                max_content_length,
            );
        }

        let disconnected: Vec<&String> = self
            .index
            .keys()
            .filter(|id| !visited_in_tree.contains(*id))
            .collect();
        if !disconnected.is_empty() {
            lines.push(String::new());
            lines.push("Disconnected thoughts:".to_string());
            for id in disconnected {
                if let Ok(thought) = self.get_thought(id) {
                    let content = truncate(&thought.content.to_string(), max_content_length);
                    lines.push(format!("  o [{:.2}] {}", thought.score, content));
                }
            }
        }

        lines.join("\n")
    }

    #[allow(clippy::too_many_arguments)]
    fn render_node(
        &self,
        id: &str,
        prefix: &str,
        is_last: bool,
        ancestors: &mut HashSet<String>,
        visited_in_tree: &mut HashSet<String>,
        lines: &mut Vec<String>,
        max_content_length: usize,
    ) where
        T: std::fmt::Display,
    {
        let Ok(thought) = self.get_thought(id) else {
            return;
        };
        let connector = if is_last { "`-- " } else { "|-- " };
        let icon = match thought.status {
            ThoughtStatus::Pending => "o",
            ThoughtStatus::Active => "*",
            ThoughtStatus::Completed => "+",
            ThoughtStatus::Pruned => "x",
            ThoughtStatus::Merged => "m",
            ThoughtStatus::Failed => "!",
        };
        let content = truncate(&thought.content.to_string(), max_content_length);

        if ancestors.contains(id) {
            let mut line = format!("{prefix}{connector}{icon} [{:.2}] {content}", thought.score);
            let _ = write!(line, " [CYCLE]");
            lines.push(line);
            return;
        }
        if visited_in_tree.contains(id) {
            let mut line = format!("{prefix}{connector}{icon} [{:.2}] {content}", thought.score);
            let _ = write!(line, " [-> see above]");
            lines.push(line);
            return;
        }

        visited_in_tree.insert(id.to_string());
        lines.push(format!("{prefix}{connector}{icon} [{:.2}] {content}", thought.score));

        let Ok(children) = self.get_children(id) else {
            return;
        };
        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "|   " });
        ancestors.insert(id.to_string());
        let n = children.len();
        let child_ids: Vec<String> = children.into_iter().map(|c| c.id.clone()).collect();
        for (i, child_id) in child_ids.into_iter().enumerate() {
            self.render_node(
                &child_id,
                &child_prefix,
                i == n - 1,
                ancestors,
                visited_in_tree,
                lines,
                max_content_length,
            );
        }
        ancestors.remove(id);
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;

    #[test]
    fn stats_count_status_and_depth() {
        let mut g: Graph<String> = Graph::new(GraphConfig::default());
        g.add_thought("a".into(), None, None, 1.0, Some(0.4), Some("a".into()), 0, 0.0, HashMap::new()).unwrap();
        g.add_thought("b".into(), Some("a"), None, 1.0, Some(0.8), Some("b".into()), 0, 0.0, HashMap::new()).unwrap();
        let stats = g.stats();
        assert_eq!(stats.total_thoughts, 2);
        assert_eq!(stats.total_edges, 1);
        assert_eq!(stats.root_count, 1);
        assert_eq!(stats.max_depth, 1);
        assert!((stats.avg_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn render_tree_includes_root_content() {
        let mut g: Graph<String> = Graph::new(GraphConfig::default());
        g.add_thought("hello world".into(), None, None, 1.0, Some(0.5), Some("a".into()), 0, 0.0, HashMap::new())
            .unwrap();
        let rendered = g.render_tree(50);
        assert!(rendered.contains("hello world"));
    }
}
