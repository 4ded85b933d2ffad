//! The graph store: owns all thoughts and edges, maintains indices, and
//! enforces the structural invariants.
//!
//! Built on `petgraph::StableDiGraph`, with a `HashMap<String, NodeIndex>`
//! side index for O(1) id lookups by the opaque thought id callers use.

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::config::GraphConfig;
use crate::errors::{GraphError, Result};
use crate::events::{EventEmitter, GraphEvent, NullEventEmitter};
use crate::metrics::{InMemoryMetricsCollector, MetricsCollector};
use crate::thought::{Edge, Thought, ThoughtStatus};

use super::dag::would_create_cycle;

/// The graph aggregate. Generic over the opaque thought content `T`.
pub struct Graph<T> {
    pub(crate) config: GraphConfig,
    pub(crate) inner: StableDiGraph<Thought<T>, Edge>,
    pub(crate) index: HashMap<String, NodeIndex>,
    pub(crate) root_ids: Vec<String>,
    pub(crate) metadata: HashMap<String, serde_json::Value>,
    pub(crate) metrics: std::sync::Arc<dyn MetricsCollector>,
    pub(crate) events: std::sync::Arc<dyn EventEmitter<T>>,
}

// `metrics`/`events` are trait objects without a `Debug` bound, so this can't
// be derived; the manual impl prints everything else and placeholders for
// those two fields.
impl<T: std::fmt::Debug> std::fmt::Debug for Graph<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("config", &self.config)
            .field("inner", &self.inner)
            .field("index", &self.index)
            .field("root_ids", &self.root_ids)
            .field("metadata", &self.metadata)
            .field("metrics", &"<dyn MetricsCollector>")
            .field("events", &"<dyn EventEmitter>")
            .finish()
    }
}

// `new` needs `T: Send + Sync + 'static` to coerce `NullEventEmitter` into
// `Arc<dyn EventEmitter<T>>`, a bound the rest of `Graph<T>`'s methods don't
// require, so it gets its own impl block rather than tightening every method.
impl<T: Send + Sync + 'static> Graph<T> {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            inner: StableDiGraph::new(),
            index: HashMap::new(),
            root_ids: Vec::new(),
            metadata: HashMap::new(),
            metrics: std::sync::Arc::new(InMemoryMetricsCollector::new()),
            events: std::sync::Arc::new(NullEventEmitter),
        }
    }
}

// `add_thought` needs `T: Clone` to snapshot the newly-inserted thought into
// the `THOUGHT_ADDED` event it publishes, and `T: Send + Sync` because that
// event is routed through `Arc<dyn EventEmitter<T>>`.
impl<T: Clone + Send + Sync> Graph<T> {
    /// Add a new thought. `parent_id = None` makes it a root.
    #[allow(clippy::too_many_arguments)]
    pub fn add_thought(
        &mut self,
        content: T,
        parent_id: Option<&str>,
        relation: Option<&str>,
        weight: f64,
        score: Option<f64>,
        id: Option<String>,
        tokens_used: u64,
        generation_time_ms: f64,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<&Thought<T>> {
        if self.inner.node_count() >= self.config.limits.max_thoughts {
            return Err(GraphError::resource_exhausted(
                "thoughts",
                self.config.limits.max_thoughts,
            ));
        }

        let depth = match parent_id {
            None => 0,
            Some(pid) => {
                let parent_idx = self.node_index(pid)?;
                self.inner[parent_idx].depth + 1
            }
        };

        let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        if self.index.contains_key(&id) {
            return Err(GraphError::graph(format!("duplicate id '{id}'")));
        }

        let mut thought = Thought::new(id.clone(), content, depth);
        thought.score = score.unwrap_or(0.0);
        thought.tokens_used = tokens_used;
        thought.generation_time_ms = generation_time_ms;
        thought.metadata = metadata;

        let idx = self.inner.add_node(thought);
        self.index.insert(id.clone(), idx);

        match parent_id {
            None => self.root_ids.push(id.clone()),
            Some(pid) => {
                self.add_edge_internal(pid, &id, relation.unwrap_or(crate::thought::RELATION_LEADS_TO), weight, HashMap::new())?;
            }
        }

        self.metrics.increment("thoughts.added", 1);
        self.metrics.gauge("thoughts.total", self.inner.node_count() as i64);
        self.events.emit_sync(GraphEvent::thought_added(self.inner[idx].clone()));

        Ok(&self.inner[idx])
    }
}

impl<T> Graph<T> {
    pub fn with_metrics(mut self, metrics: std::sync::Arc<dyn MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Wire an emitter so thoughts seeded directly through `add_thought`
    /// (roots, in particular) publish `THOUGHT_ADDED` the same way the
    /// expansion engine does for children it commits.
    pub fn with_events(mut self, events: std::sync::Arc<dyn EventEmitter<T>>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn root_ids(&self) -> &[String] {
        &self.root_ids
    }

    pub fn len(&self) -> usize {
        self.inner.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn edges(&self) -> Vec<&Edge> {
        self.inner.edge_weights().collect()
    }

    fn node_index(&self, id: &str) -> Result<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::node_not_found(id))
    }

    pub fn get_thought(&self, id: &str) -> Result<&Thought<T>> {
        let idx = self.node_index(id)?;
        Ok(&self.inner[idx])
    }

    pub fn get_thought_mut(&mut self, id: &str) -> Result<&mut Thought<T>> {
        let idx = self.node_index(id)?;
        Ok(&mut self.inner[idx])
    }

    pub fn get_children(&self, id: &str) -> Result<Vec<&Thought<T>>> {
        let idx = self.node_index(id)?;
        Ok(self
            .inner
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| &self.inner[n])
            .collect())
    }

    pub fn get_parents(&self, id: &str) -> Result<Vec<&Thought<T>>> {
        let idx = self.node_index(id)?;
        Ok(self
            .inner
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .map(|n| &self.inner[n])
            .collect())
    }

    /// First parent in insertion order — deterministic but arbitrary when a
    /// thought has more than one parent, since a DAG doesn't have a single
    /// canonical path to root.
    fn first_parent_id(&self, idx: NodeIndex) -> Option<String> {
        self.inner
            .edges_directed(idx, petgraph::Direction::Incoming)
            .min_by_key(|e| e.id().index())
            .map(|e| self.inner[e.source()].id.clone())
    }

    pub fn get_edge(&self, source_id: &str, target_id: &str) -> Option<&Edge> {
        let src = self.index.get(source_id)?;
        let tgt = self.index.get(target_id)?;
        let edge_idx = self.inner.find_edge(*src, *tgt)?;
        self.inner.edge_weight(edge_idx)
    }

    fn add_edge_internal(
        &mut self,
        source_id: &str,
        target_id: &str,
        relation: &str,
        weight: f64,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        let src = self.node_index(source_id)?;
        let tgt = self.node_index(target_id)?;

        if let Some(existing) = self.inner.find_edge(src, tgt) {
            let edge = &mut self.inner[existing];
            edge.relation = relation.to_string();
            edge.weight = weight;
            edge.metadata = metadata;
            return Ok(());
        }

        if !self.config.allow_cycles && would_create_cycle(&self.inner, src, tgt) {
            return Err(GraphError::cycle_detected(source_id, target_id));
        }

        let mut edge = Edge::new(source_id, target_id);
        edge.relation = relation.to_string();
        edge.weight = weight;
        edge.metadata = metadata;
        self.inner.add_edge(src, tgt, edge);
        self.metrics.increment("edges.added", 1);
        Ok(())
    }

    /// Public operation to add an edge between two existing thoughts,
    /// independent of `add_thought`'s implicit parent edge.
    pub fn add_edge(
        &mut self,
        source_id: &str,
        target_id: &str,
        relation: Option<&str>,
        weight: f64,
        metadata: HashMap<String, serde_json::Value>,
    ) -> Result<&Edge> {
        self.add_edge_internal(
            source_id,
            target_id,
            relation.unwrap_or(crate::thought::RELATION_LEADS_TO),
            weight,
            metadata,
        )?;
        Ok(self.get_edge(source_id, target_id).expect("just inserted"))
    }

    pub fn remove_thought(&mut self, id: &str) -> Result<Thought<T>> {
        let idx = self.node_index(id)?;
        let thought = self
            .inner
            .remove_node(idx)
            .ok_or_else(|| GraphError::node_not_found(id))?;
        self.index.remove(id);
        self.root_ids.retain(|rid| rid != id);

        self.metrics.increment("thoughts.removed", 1);
        self.metrics.gauge("thoughts.total", self.inner.node_count() as i64);

        Ok(thought)
    }

    pub fn remove_edge(&mut self, source_id: &str, target_id: &str) -> Option<Edge> {
        let src = *self.index.get(source_id)?;
        let tgt = *self.index.get(target_id)?;
        let edge_idx = self.inner.find_edge(src, tgt)?;
        let edge = self.inner.remove_edge(edge_idx);
        if edge.is_some() {
            self.metrics.increment("edges.removed", 1);
        }
        edge
    }

    pub fn get_path_to_root(&self, id: &str) -> Result<Vec<&Thought<T>>> {
        let mut idx = self.node_index(id)?;
        let mut path = Vec::new();
        let mut visited = std::collections::HashSet::new();

        loop {
            let tid = &self.inner[idx].id;
            if !visited.insert(tid.clone()) {
                break;
            }
            path.push(idx);
            match self.first_parent_id(idx) {
                Some(pid) => idx = self.index[&pid],
                None => break,
            }
        }

        path.reverse();
        Ok(path.into_iter().map(|i| &self.inner[i]).collect())
    }

    pub fn get_leaves(&self, include_pruned: bool) -> Vec<&Thought<T>> {
        self.inner
            .node_indices()
            .filter(|&idx| {
                self.inner
                    .neighbors_directed(idx, petgraph::Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.inner[idx])
            .filter(|t| include_pruned || t.status != ThoughtStatus::Pruned)
            .collect()
    }

    pub fn best_path(&self) -> Vec<&Thought<T>> {
        let leaves = self.get_leaves(false);
        match leaves.into_iter().max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal)) {
            Some(best) => self.get_path_to_root(&best.id).unwrap_or_default(),
            None => Vec::new(),
        }
    }
}
