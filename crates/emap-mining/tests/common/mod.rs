#![allow(dead_code)]

use emap_core::{ContactEdge, HostStructure, Residue, ResidueGraph, ResidueNode};
use std::sync::Arc;

pub const TYR: u32 = 2;
pub const TRP: u32 = 1;

/// One tyrosine–tryptophan contact of a host structure.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub tyr: i64,
    pub trp: i64,
    pub aligned: (i64, i64),
    pub ca: ([f64; 3], [f64; 3]),
    pub weight: f64,
}

impl Contact {
    pub fn new(tyr: i64, trp: i64) -> Self {
        Self {
            tyr,
            trp,
            aligned: (tyr, trp),
            ca: ([0.0, 0.0, 0.0], [3.8, 0.0, 0.0]),
            weight: 1.0,
        }
    }

    pub fn aligned(mut self, tyr: i64, trp: i64) -> Self {
        self.aligned = (tyr, trp);
        self
    }

    pub fn ca(mut self, tyr: [f64; 3], trp: [f64; 3]) -> Self {
        self.ca = (tyr, trp);
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Host whose graph contains the given Y–W contacts (chain A).
pub fn host(id: &str, contacts: &[Contact]) -> Arc<HostStructure> {
    let mut graph = ResidueGraph::new("");
    let mut structure_residues = Vec::new();
    for c in contacts {
        let y = format!("Y{}(A)", c.tyr);
        let w = format!("W{}(A)", c.trp);
        graph.add_node(ResidueNode::new(y.clone(), "Y", TYR).with_shape("box"));
        graph.add_node(ResidueNode::new(w.clone(), "W", TRP).with_shape("box"));
        graph
            .add_edge(
                &y,
                &w,
                ContactEdge::new(1).with_weight(c.weight).with_distance(9.0),
            )
            .expect("contact edge");
        structure_residues.push((
            y,
            Residue::new(c.tyr)
                .with_aligned(c.aligned.0)
                .with_atom("N", [c.ca.0[0] - 1.0, c.ca.0[1], c.ca.0[2]])
                .with_atom("CA", c.ca.0)
                .with_selection(format!("[TYR]{}:A.*", c.tyr)),
        ));
        structure_residues.push((
            w,
            Residue::new(c.trp)
                .with_aligned(c.aligned.1)
                .with_atom("N", [c.ca.1[0] + 1.0, c.ca.1[1], c.ca.1[2]])
                .with_atom("CA", c.ca.1)
                .with_selection(format!("[TRP]{}:A.*", c.trp)),
        ));
    }

    let mut structure = HostStructure::new(id, graph);
    for (name, residue) in structure_residues {
        structure.insert_residue(name, residue);
    }
    Arc::new(structure)
}

/// Two-node Y–W pattern with a class-1 edge.
pub fn yw_pattern() -> ResidueGraph {
    let mut p = ResidueGraph::new("pattern");
    p.add_node(ResidueNode::new("0", "Y", TYR));
    p.add_node(ResidueNode::new("1", "W", TRP));
    p.add_edge("0", "1", ContactEdge::new(1)).expect("pattern edge");
    p
}

/// Two-node W–W pattern with a class-1 edge.
pub fn ww_pattern() -> ResidueGraph {
    let mut p = ResidueGraph::new("pattern");
    p.add_node(ResidueNode::new("0", "W", TRP));
    p.add_node(ResidueNode::new("1", "W", TRP));
    p.add_edge("0", "1", ContactEdge::new(1)).expect("pattern edge");
    p
}
