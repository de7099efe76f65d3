//! Graph loader: parses the static graph description document.
//!
//! The document carries the adjacency lists, a layout position per node and
//! optional metadata. Nothing here is mutated after load.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ReplayError, ReplayResult};

pub type NodeId = u32;

/// The graph description document as it appears on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub adjacency: BTreeMap<NodeId, Vec<(NodeId, f64)>>,
    pub positions: BTreeMap<NodeId, [f64; 2]>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// First entry is a sentinel (the start marker), the rest are exits.
    /// Kept as raw JSON because the sentinel is not necessarily a node id.
    #[serde(default)]
    pub exit_nodes: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Metadata {
    /// True exit node ids: the sentinel entry is dropped, ids given as
    /// numbers or numeric strings are accepted, anything else is skipped.
    pub fn exits(&self) -> Vec<NodeId> {
        self.exit_nodes
            .iter()
            .skip(1)
            .filter_map(|value| {
                let id = match value {
                    serde_json::Value::Number(n) => n.as_u64().and_then(|n| NodeId::try_from(n).ok()),
                    serde_json::Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                };
                if id.is_none() {
                    warn!(%value, "ignoring exit entry that is not a node id");
                }
                id
            })
            .collect()
    }
}

/// Directed weighted graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: BTreeMap<NodeId, Vec<(NodeId, f64)>>,
    weights: HashMap<(NodeId, NodeId), f64>,
}

impl Graph {
    pub fn from_adjacency(adjacency: BTreeMap<NodeId, Vec<(NodeId, f64)>>) -> Self {
        let mut weights = HashMap::new();
        for (&from, neighbors) in &adjacency {
            for &(to, weight) in neighbors {
                if weight.is_nan() || weight <= 0.0 {
                    warn!(from, to, weight, "edge weight is not positive");
                }
                // Later duplicates win, like re-adding an edge to a digraph.
                weights.insert((from, to), weight);
            }
        }
        Graph { adjacency, weights }
    }

    pub fn weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.weights.get(&(from, to)).copied()
    }

    /// Every directed edge, ordered by source node.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.adjacency
            .iter()
            .flat_map(|(&from, neighbors)| neighbors.iter().map(move |&(to, w)| (from, to, w)))
    }

    pub fn adjacency(&self) -> &BTreeMap<NodeId, Vec<(NodeId, f64)>> {
        &self.adjacency
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }
}

/// Everything produced by loading a graph description.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub graph: Graph,
    pub positions: BTreeMap<NodeId, [f64; 2]>,
    pub metadata: Metadata,
    pub exits: Vec<NodeId>,
}

impl LoadedGraph {
    pub fn from_document(doc: GraphDocument) -> Self {
        let exits = doc.metadata.exits();
        let graph = Graph::from_adjacency(doc.adjacency);
        LoadedGraph {
            graph,
            positions: doc.positions,
            metadata: doc.metadata,
            exits,
        }
    }

    pub fn load(path: &Path) -> ReplayResult<Self> {
        let doc: GraphDocument = read_json(path)?;
        let loaded = Self::from_document(doc);
        info!(
            path = %path.display(),
            nodes = loaded.positions.len(),
            edges = loaded.graph.edge_count(),
            exits = loaded.exits.len(),
            "loaded graph"
        );
        Ok(loaded)
    }
}

/// Read and parse a JSON input document. A file that cannot be opened is
/// a missing input; one that cannot be parsed is a parse error.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> ReplayResult<T> {
    let json = fs::read_to_string(path).map_err(|source| ReplayError::MissingInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| ReplayError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
