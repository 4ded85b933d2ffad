//! Checkpoint/serialization contract: a portable record of thoughts, edges,
//! roots, config, and metadata that round-trips through [`Graph::to_record`]
//! and [`Graph::from_record`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::GraphConfig;
use crate::errors::{GraphError, Result};
use crate::graph::Graph;
use crate::thought::{Edge, Thought, ThoughtStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtRecord<T> {
    pub id: String,
    pub content: T,
    pub score: f64,
    pub depth: u32,
    pub status: String,
    pub tokens_used: u64,
    pub generation_time_ms: f64,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source_id: String,
    pub target_id: String,
    pub relation: String,
    pub weight: f64,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRecord<T> {
    pub thoughts: HashMap<String, ThoughtRecord<T>>,
    pub edges: Vec<EdgeRecord>,
    pub roots: Vec<String>,
    pub config: GraphConfig,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<T: Clone> From<&Thought<T>> for ThoughtRecord<T> {
    fn from(t: &Thought<T>) -> Self {
        Self {
            id: t.id.clone(),
            content: t.content.clone(),
            score: t.score,
            depth: t.depth,
            status: t.status.as_str().to_string(),
            tokens_used: t.tokens_used,
            generation_time_ms: t.generation_time_ms,
            metadata: t.metadata.clone(),
        }
    }
}

impl From<&Edge> for EdgeRecord {
    fn from(e: &Edge) -> Self {
        Self {
            source_id: e.source_id.clone(),
            target_id: e.target_id.clone(),
            relation: e.relation.clone(),
            weight: e.weight,
            metadata: e.metadata.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Graph<T> {
    pub fn to_record(&self) -> GraphRecord<T> {
        let thoughts = self
            .inner
            .node_weights()
            .map(|t| (t.id.clone(), ThoughtRecord::from(t)))
            .collect();
        let edges = self.edges().into_iter().map(EdgeRecord::from).collect();

        GraphRecord {
            thoughts,
            edges,
            roots: self.root_ids.clone(),
            config: self.config.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Rebuild a graph from a record. Thoughts are installed with their
    /// full field set (status restored from its symbolic name); edges are
    /// installed with cycle-checking disabled, silently dropping any edge
    /// whose endpoints are missing, then `allow_cycles` is restored to the
    /// loaded config's value.
    pub fn from_record(record: GraphRecord<T>) -> Result<Self> {
        record.config.validate()?;

        let mut graph = Graph::new(record.config.clone());
        graph.config.allow_cycles = true;

        for (id, trecord) in &record.thoughts {
            let status = ThoughtStatus::from_str_name(&trecord.status).ok_or_else(|| {
                GraphError::configuration(vec![format!(
                    "unknown thought status '{}' for thought {id}",
                    trecord.status
                )])
            })?;
            let mut thought = Thought::new(trecord.id.clone(), trecord.content.clone(), trecord.depth);
            thought.score = trecord.score;
            thought.status = status;
            thought.tokens_used = trecord.tokens_used;
            thought.generation_time_ms = trecord.generation_time_ms;
            thought.metadata = trecord.metadata.clone();

            let idx = graph.inner.add_node(thought);
            graph.index.insert(trecord.id.clone(), idx);
        }

        graph.root_ids = record.roots.clone();

        for edge_record in &record.edges {
            if let (Some(&src), Some(&tgt)) = (
                graph.index.get(&edge_record.source_id),
                graph.index.get(&edge_record.target_id),
            ) {
                let mut edge = Edge::new(&edge_record.source_id, &edge_record.target_id);
                edge.relation = edge_record.relation.clone();
                edge.weight = edge_record.weight;
                edge.metadata = edge_record.metadata.clone();
                graph.inner.add_edge(src, tgt, edge);
            }
            // Unknown endpoints are dropped silently, per the serialization contract.
        }

        graph.config.allow_cycles = record.config.allow_cycles;
        graph.metadata = record.metadata;

        Ok(graph)
    }

    pub fn to_json(&self) -> Result<String>
    where
        T: Serialize,
    {
        serde_json::to_string_pretty(&self.to_record())
            .map_err(|e| GraphError::Persistence { op: "to_json".into(), cause: e.to_string() })
    }

    pub fn from_json(json: &str) -> Result<Self>
    where
        T: for<'de> Deserialize<'de>,
    {
        let record: GraphRecord<T> = serde_json::from_str(json)
            .map_err(|e| GraphError::Persistence { op: "from_json".into(), cause: e.to_string() })?;
        Self::from_record(record)
    }
}
