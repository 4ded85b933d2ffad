//! Cycle detection.
//!
//! Reachability check: DFS from the proposed edge's target to see whether
//! it can already reach the source, which is exactly the condition under
//! which adding `source -> target` would close a cycle. `O(V+E)` worst
//! case, fine at the scale a single reasoning graph reaches (thousands of
//! thoughts, not millions).

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::Dfs;

use crate::thought::{Edge, Thought};

/// Would adding an edge `source -> target` create a directed cycle in
/// `graph`? Self-loops are always cycles.
pub fn would_create_cycle<T>(
    graph: &StableDiGraph<Thought<T>, Edge>,
    source: NodeIndex,
    target: NodeIndex,
) -> bool {
    if source == target {
        return true;
    }
    has_path(graph, target, source)
}

fn has_path<T>(graph: &StableDiGraph<Thought<T>, Edge>, from: NodeIndex, to: NodeIndex) -> bool {
    let mut dfs = Dfs::new(graph, from);
    while let Some(node) = dfs.next(graph) {
        if node == to {
            return true;
        }
    }
    false
}
