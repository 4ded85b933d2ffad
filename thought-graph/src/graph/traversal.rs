//! BFS/DFS traversal over the graph's thoughts.
//!
//! Eagerly collected (not lazy iterators over borrowed state) to keep the
//! borrow checker happy across a generic `Graph<T>` while still matching the
//! spec's "visit each thought at most once, children in insertion order"
//! contract.

use std::collections::{HashSet, VecDeque};

use super::store::Graph;
use crate::thought::{Thought, ThoughtStatus};

impl<T> Graph<T> {
    fn start_ids(&self, start_id: Option<&str>) -> Vec<String> {
        match start_id {
            Some(id) => vec![id.to_string()],
            None => self.root_ids.clone(),
        }
    }

    pub fn bfs(&self, start_id: Option<&str>, include_pruned: bool) -> Vec<&Thought<T>> {
        let mut visited = HashSet::new();
        let mut queue: VecDeque<String> = self.start_ids(start_id).into();
        let mut out = Vec::new();

        while let Some(current_id) = queue.pop_front() {
            if !visited.insert(current_id.clone()) {
                continue;
            }
            let Ok(thought) = self.get_thought(&current_id) else {
                continue;
            };
            if include_pruned || thought.status != ThoughtStatus::Pruned {
                out.push(thought);
            }
            if let Ok(children) = self.get_children(&current_id) {
                for child in children {
                    if !visited.contains(&child.id) {
                        queue.push_back(child.id.clone());
                    }
                }
            }
        }

        out
    }

    pub fn dfs(&self, start_id: Option<&str>, include_pruned: bool) -> Vec<&Thought<T>> {
        let mut visited = HashSet::new();
        let mut stack: Vec<String> = self.start_ids(start_id).into_iter().rev().collect();
        let mut out = Vec::new();

        while let Some(current_id) = stack.pop() {
            if !visited.insert(current_id.clone()) {
                continue;
            }
            let Ok(thought) = self.get_thought(&current_id) else {
                continue;
            };
            if include_pruned || thought.status != ThoughtStatus::Pruned {
                out.push(thought);
            }
            if let Ok(children) = self.get_children(&current_id) {
                for child in children.into_iter().rev() {
                    if !visited.contains(&child.id) {
                        stack.push(child.id.clone());
                    }
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use std::collections::HashMap;

    fn build_tree() -> Graph<String> {
        let mut g = Graph::new(GraphConfig::default());
        g.add_thought("root".into(), None, None, 1.0, None, Some("r".into()), 0, 0.0, HashMap::new()).unwrap();
        g.add_thought("a".into(), Some("r"), None, 1.0, None, Some("a".into()), 0, 0.0, HashMap::new()).unwrap();
        g.add_thought("b".into(), Some("r"), None, 1.0, None, Some("b".into()), 0, 0.0, HashMap::new()).unwrap();
        g.add_thought("a1".into(), Some("a"), None, 1.0, None, Some("a1".into()), 0, 0.0, HashMap::new()).unwrap();
        g
    }

    #[test]
    fn bfs_visits_level_by_level() {
        let g = build_tree();
        let ids: Vec<&str> = g.bfs(None, false).into_iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["r", "a", "b", "a1"]);
    }

    #[test]
    fn dfs_follows_a_branch_before_backtracking() {
        let g = build_tree();
        let ids: Vec<&str> = g.dfs(None, false).into_iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["r", "a", "a1", "b"]);
    }

    #[test]
    fn traversal_visits_each_node_at_most_once() {
        let g = build_tree();
        let ids = g.bfs(None, false);
        let unique: HashSet<&str> = ids.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), unique.len());
    }
}
