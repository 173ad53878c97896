//! Drawable graphs and molecular-viewer metadata.
//!
//! Rendering is left to external tools: patterns and occurrences are
//! exported as Graphviz DOT, and occurrences can be described as a list of
//! viewer selections (label, anchor atom, color, selection expression).

use crate::pattern::SubgraphPattern;
use emap_core::{ContactEdge, EmapError, ResidueGraph, Result};
use petgraph::dot::{Config, Dot};
use petgraph::graph::UnGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Fallback color for cofactors and non-aromatic residues.
pub const DEFAULT_COLOR: &str = "pink";

/// Viewer color for a residue, keyed by its one-letter code.
pub fn residue_color(code: char) -> Option<&'static str> {
    match code {
        'F' => Some("orange"),
        'Y' => Some("blue"),
        'W' => Some("red"),
        'H' => Some("green"),
        _ => None,
    }
}

/// Node of a drawable graph
#[derive(Debug, Clone, PartialEq)]
pub struct DrawNode {
    pub label: String,
    pub shape: String,
    pub color: &'static str,
}

impl fmt::Display for DrawNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Edge of a drawable graph
#[derive(Debug, Clone, PartialEq)]
pub struct DrawEdge {
    pub label: String,
}

impl fmt::Display for DrawEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Styled copy of a pattern or occurrence graph
#[derive(Debug, Clone)]
pub struct DrawableGraph {
    pub name: String,
    pub graph: UnGraph<DrawNode, DrawEdge>,
}

impl DrawableGraph {
    fn from_residue_graph<N, E>(
        name: String,
        source: &ResidueGraph,
        node_label: N,
        edge_label: E,
    ) -> Self
    where
        N: Fn(&str, &str) -> String,
        E: Fn(&ContactEdge) -> String,
    {
        let mut graph = UnGraph::with_capacity(source.node_count(), source.edge_count());
        let mut placed = Vec::with_capacity(source.node_count());
        for node in source.nodes() {
            let color = node
                .label
                .chars()
                .next()
                .and_then(residue_color)
                .unwrap_or(DEFAULT_COLOR);
            let shape = if node.shape.is_empty() {
                "ellipse".to_string()
            } else {
                node.shape.clone()
            };
            placed.push(graph.add_node(DrawNode {
                label: node_label(&node.label, &node.name),
                shape,
                color,
            }));
        }
        for (a, b, edge) in source.edges() {
            graph.add_edge(
                placed[a.index()],
                placed[b.index()],
                DrawEdge {
                    label: edge_label(edge),
                },
            );
        }
        Self { name, graph }
    }

    /// Graphviz source with filled, colored nodes.
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, edge| format!("label=\"{}\" len=1.0", edge.weight()),
            &|_, (_, node)| {
                format!(
                    "label=\"{}\" shape={} style=filled fillcolor={}",
                    node.label, node.shape, node.color
                )
            },
        );
        dot.to_string()
    }
}

/// Viewer annotation for one occurrence residue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerSelection {
    /// Label text (residue name, e.g. `W382(A)`)
    pub label_text: String,
    /// Anchor atom for the label
    pub atom: String,
    pub color: String,
    /// Selection expression for the whole residue
    pub selection: String,
    /// Selection expression for the label anchor
    pub label_selection: String,
}

/// Selection prefix up to the first `)`, closed with `]`.
pub fn label_selection(selection: &str) -> String {
    match selection.find(')') {
        Some(pos) => format!("{}]", &selection[..=pos]),
        None => selection.to_string(),
    }
}

impl SubgraphPattern {
    /// Drawable form of the pattern (`None`) or of one occurrence.
    pub fn drawable(&self, id: Option<&str>) -> Result<DrawableGraph> {
        match id {
            None => Ok(DrawableGraph::from_residue_graph(
                self.file_id().to_string(),
                self.graph(),
                |label, _| label.to_string(),
                |e| e.num_label.to_string(),
            )),
            Some(id) => {
                let occurrence = self.occurrence(id)?;
                Ok(DrawableGraph::from_residue_graph(
                    format!("{}_{}", self.file_id(), id),
                    occurrence.graph(),
                    |_, name| name.to_string(),
                    |e| format!("{:.2}", e.distance),
                ))
            }
        }
    }

    /// Writes the DOT file of the pattern or an occurrence.
    ///
    /// Without `dest` the file is `{file_id}.dot` (pattern) or
    /// `{file_id}_{id}.dot` (occurrence) in the working directory.
    pub fn write_dot(&self, id: Option<&str>, dest: Option<&Path>) -> Result<PathBuf> {
        let drawable = self.drawable(id)?;
        let path = match dest {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(format!("{}.dot", drawable.name)),
        };
        std::fs::write(&path, drawable.to_dot())?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Label, anchor atom, color and selection for each occurrence residue.
    pub fn viewer_metadata(&self, id: &str) -> Result<Vec<ViewerSelection>> {
        let occurrence = self.occurrence(id)?;
        let host = self.host(occurrence.structure_id())?;

        occurrence
            .graph()
            .nodes()
            .map(|node| {
                let residue = host.residue(&node.name)?;
                let standard = if residue.is_eta_moiety {
                    None
                } else {
                    node.name.chars().next().and_then(residue_color)
                };
                let (atom, color) = match standard {
                    Some(color) => (".CA".to_string(), color),
                    None => {
                        let first = residue.first_atom().ok_or_else(|| {
                            EmapError::missing_atoms(host.id.clone(), node.name.clone())
                        })?;
                        (first.name.clone(), DEFAULT_COLOR)
                    }
                };
                Ok(ViewerSelection {
                    label_text: node.name.clone(),
                    atom,
                    color: color.to_string(),
                    label_selection: label_selection(&residue.selection),
                    selection: residue.selection.clone(),
                })
            })
            .collect()
    }
}
