//! Occurrences: pattern embeddings materialized as host-labeled graphs.

use crate::matcher::NodeMapping;
use emap_core::{EmapError, HostStructure, ResidueGraph, ResidueNode, Result};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// One embedding of a pattern in a host structure.
///
/// Nodes are named after the host residues and inserted in ascending
/// residue sequence-number order; reports rely on that order.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    id: Option<String>,
    structure_id: String,
    graph: ResidueGraph,
}

impl Occurrence {
    /// Materializes `mapping` (pattern node → host node) as an occurrence.
    pub fn build(
        mapping: &NodeMapping,
        host: &HostStructure,
        pattern: &ResidueGraph,
    ) -> Result<Self> {
        let mut placed: Vec<(i64, NodeIndex)> = Vec::with_capacity(mapping.len());
        for &(_, host_idx) in mapping {
            let name = &host.graph.node(host_idx).name;
            let residue = host.residue(name)?;
            placed.push((residue.seq_number, host_idx));
        }
        // stable: ties keep mapping order
        placed.sort_by_key(|&(seq, _)| seq);

        let mut graph = ResidueGraph::new(host.id.clone());
        for &(seq, host_idx) in &placed {
            let host_node = host.graph.node(host_idx);
            let residue = host.residue(&host_node.name)?;
            let mut node = ResidueNode::new(
                host_node.name.clone(),
                host_node.name.clone(),
                host_node.num_label,
            )
            .with_shape(host_node.shape.clone());
            node.resnum = Some(seq);
            node.aligned_resnum = residue.aligned_residue_number;
            graph.add_node(node);
        }

        let image: HashMap<NodeIndex, NodeIndex> = mapping.iter().copied().collect();
        let image_of = |idx: NodeIndex| {
            image.get(&idx).copied().ok_or_else(|| {
                EmapError::missing_node(pattern.id(), pattern.node(idx).name.clone())
            })
        };
        for (a, b, _) in pattern.edges() {
            let (ha, hb) = (image_of(a)?, image_of(b)?);
            let (name_a, name_b) = (&host.graph.node(ha).name, &host.graph.node(hb).name);
            let attrs = host
                .graph
                .edge_between(ha, hb)
                .ok_or_else(|| EmapError::missing_edge(host.id.clone(), name_a, name_b))?;
            graph.add_edge(name_a, name_b, attrs.clone())?;
        }

        Ok(Self {
            id: None,
            structure_id: host.id.clone(),
            graph,
        })
    }

    /// Assigns the pool-wide id `{structure}_{rank}` (rank is 1-based).
    pub fn assign_id(&mut self, rank: usize) {
        let id = format!("{}_{}", self.structure_id, rank);
        self.graph.set_id(id.clone());
        self.id = Some(id);
    }

    /// Assigned id, or the host id before assignment.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.structure_id)
    }

    pub fn structure_id(&self) -> &str {
        &self.structure_id
    }

    pub fn graph(&self) -> &ResidueGraph {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Sum of copied host edge weights; pool ordering key.
    pub fn total_weight(&self) -> f64 {
        self.graph.total_weight()
    }
}
