//! Labeled residue graphs.
//!
//! Pattern graphs, host structure graphs and occurrence graphs all share the
//! same representation: an undirected petgraph graph whose nodes are keyed by
//! a unique name (residue identity such as `W382(A)` in a host, `0..k` in a
//! pattern) and carry the categorical/numeric labels used for matching.

use crate::errors::{EmapError, Result};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Node of a residue graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidueNode {
    /// Unique node identity within its graph
    pub name: String,

    /// Categorical label (residue one-letter code, cofactor name, `#`)
    pub label: String,

    /// Numeric label code used by the matcher
    #[serde(default)]
    pub num_label: u32,

    /// Drawing shape hint carried through from the structure graph
    #[serde(default)]
    pub shape: String,

    /// Residue sequence number (occurrence graphs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resnum: Option<i64>,

    /// Alignment-normalized sequence position; `None` means not aligned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aligned_resnum: Option<i64>,
}

impl ResidueNode {
    pub fn new(name: impl Into<String>, label: impl Into<String>, num_label: u32) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            num_label,
            shape: String::new(),
            resnum: None,
            aligned_resnum: None,
        }
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = shape.into();
        self
    }

    /// Aligned position as printed in reports (`X` when not aligned).
    pub fn aligned_label(&self) -> String {
        match self.aligned_resnum {
            Some(n) => n.to_string(),
            None => "X".to_string(),
        }
    }
}

/// Edge of a residue graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactEdge {
    /// Distance threshold class
    #[serde(default)]
    pub num_label: u32,

    /// Edge weight (pathway cost in the source structure graph)
    #[serde(default)]
    pub weight: f64,

    /// Geometric distance between the two residues (Å)
    #[serde(default)]
    pub distance: f64,
}

impl ContactEdge {
    pub fn new(num_label: u32) -> Self {
        Self {
            num_label,
            ..Default::default()
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }
}

/// Undirected residue graph with name-indexed nodes.
///
/// Node indices follow insertion order, which callers rely on for
/// reporting (occurrence graphs are built in sequence-number order).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphRecord", into = "GraphRecord")]
pub struct ResidueGraph {
    id: String,
    graph: UnGraph<ResidueNode, ContactEdge>,
    index: HashMap<String, NodeIndex>,
}

impl ResidueGraph {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            graph: UnGraph::default(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Adds a node, or replaces the attributes of the node with the same name.
    pub fn add_node(&mut self, node: ResidueNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node.name) {
            self.graph[idx] = node;
            return idx;
        }
        let name = node.name.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(name, idx);
        idx
    }

    /// Adds (or updates) the edge between two named nodes.
    pub fn add_edge(&mut self, a: &str, b: &str, edge: ContactEdge) -> Result<EdgeIndex> {
        let ia = self.require(a)?;
        let ib = self.require(b)?;
        if ia == ib {
            return Err(EmapError::validation(format!(
                "self-loop on node '{}' in graph '{}'",
                a, self.id
            )));
        }
        Ok(self.graph.update_edge(ia, ib, edge))
    }

    fn require(&self, name: &str) -> Result<NodeIndex> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| EmapError::missing_node(self.id.clone(), name))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn index_of(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &ResidueNode {
        &self.graph[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut ResidueNode {
        &mut self.graph[idx]
    }

    pub fn node_by_name(&self, name: &str) -> Option<&ResidueNode> {
        self.index_of(name).map(|idx| &self.graph[idx])
    }

    /// Node indices in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &ResidueNode> + '_ {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// Neighbors of a node, ordered by node insertion index.
    pub fn neighbors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn has_edge(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    pub fn edge_between(&self, a: NodeIndex, b: NodeIndex) -> Option<&ContactEdge> {
        self.graph.find_edge(a, b).map(|e| &self.graph[e])
    }

    /// Edges in insertion order as `(endpoint, endpoint, attributes)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &ContactEdge)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    /// Sum of edge weights.
    pub fn total_weight(&self) -> f64 {
        self.graph.edge_weights().map(|e| e.weight).sum()
    }

    /// Sum of edge threshold classes.
    pub fn weighted_size(&self) -> u64 {
        self.graph.edge_weights().map(|e| e.num_label as u64).sum()
    }

    /// Order-independent textual signature of the labeled structure.
    ///
    /// Two graphs have the same signature iff they are equal under
    /// `PartialEq` (same named nodes and edges with the same attributes).
    pub fn signature(&self) -> String {
        let mut nodes: Vec<&ResidueNode> = self.nodes().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));

        let mut edges: Vec<(String, String, String)> = self
            .edges()
            .map(|(a, b, e)| {
                let (na, nb) = (&self.graph[a].name, &self.graph[b].name);
                let (lo, hi) = if na <= nb { (na, nb) } else { (nb, na) };
                (
                    lo.clone(),
                    hi.clone(),
                    format!("{}|{:?}|{:?}", e.num_label, e.weight, e.distance),
                )
            })
            .collect();
        edges.sort();

        let mut out = String::new();
        for n in nodes {
            let _ = write!(
                out,
                "{}:{}:{}:{}:{:?}:{:?};",
                n.name, n.label, n.num_label, n.shape, n.resnum, n.aligned_resnum
            );
        }
        out.push('/');
        for (a, b, attrs) in edges {
            let _ = write!(out, "{}-{}:{};", a, b, attrs);
        }
        out
    }
}

impl PartialEq for ResidueGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.node_count() != other.node_count() || self.edge_count() != other.edge_count() {
            return false;
        }
        let nodes_match = self
            .nodes()
            .all(|n| other.node_by_name(&n.name).map_or(false, |m| m == n));
        if !nodes_match {
            return false;
        }
        self.edges().all(|(a, b, e)| {
            match (
                other.index_of(&self.graph[a].name),
                other.index_of(&self.graph[b].name),
            ) {
                (Some(oa), Some(ob)) => other.edge_between(oa, ob) == Some(e),
                _ => false,
            }
        })
    }
}

// ============================================================================
// Serialized form
// ============================================================================

/// Edge entry of the serialized graph form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub attrs: ContactEdge,
}

/// Serialized graph form: `{id, nodes[], edges[]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<ResidueNode>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl TryFrom<GraphRecord> for ResidueGraph {
    type Error = EmapError;

    fn try_from(record: GraphRecord) -> Result<Self> {
        let mut graph = ResidueGraph::new(record.id);
        for node in record.nodes {
            if graph.index.contains_key(&node.name) {
                return Err(EmapError::validation(format!(
                    "duplicate node '{}' in graph '{}'",
                    node.name, graph.id
                )));
            }
            graph.add_node(node);
        }
        for edge in record.edges {
            graph.add_edge(&edge.source, &edge.target, edge.attrs)?;
        }
        Ok(graph)
    }
}

impl From<ResidueGraph> for GraphRecord {
    fn from(graph: ResidueGraph) -> Self {
        let edges = graph
            .edges()
            .map(|(a, b, e)| EdgeRecord {
                source: graph.graph[a].name.clone(),
                target: graph.graph[b].name.clone(),
                attrs: e.clone(),
            })
            .collect();
        let nodes = graph.nodes().cloned().collect();
        GraphRecord {
            id: graph.id,
            nodes,
            edges,
        }
    }
}
