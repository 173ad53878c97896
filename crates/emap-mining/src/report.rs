//! Text reports for a pattern and its occurrences.

use crate::occurrence::Occurrence;
use crate::pattern::SubgraphPattern;
use emap_core::{ContactEdge, ResidueGraph, ResidueNode, Result};
use std::fmt::Write as _;

/// Shown by [`SubgraphPattern::full_report`] before discovery has run.
pub const MISSING_RUN_MESSAGE: &str = "Please run `find_protein_subgraphs' to get a full report.";

const GROUP_RULE: &str = "---------------";

/// `label + name:[neighbor(edge), ...]` for every node in insertion order.
fn adjacency_lines<N, E>(graph: &ResidueGraph, out: &mut String, node_text: N, edge_text: E)
where
    N: Fn(&ResidueNode) -> String,
    E: Fn(&ContactEdge) -> String,
{
    for idx in graph.node_indices() {
        let neighbors: Vec<String> = graph
            .neighbors(idx)
            .into_iter()
            .filter_map(|nb| {
                graph
                    .edge_between(idx, nb)
                    .map(|e| format!("{}({})", node_text(graph.node(nb)), edge_text(e)))
            })
            .collect();
        let _ = writeln!(out, "{}:[{}]", node_text(graph.node(idx)), neighbors.join(", "));
    }
}

fn quoted_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("'{}'", s)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Per-occurrence block of the full report.
pub fn occurrence_report(occurrence: &Occurrence) -> String {
    let graph = occurrence.graph();
    let mut out = String::new();
    let _ = writeln!(out, "{}", occurrence.id());
    out.push_str("Nodes\n");
    for node in graph.nodes() {
        let _ = writeln!(out, "{} Position in alignment:{}", node.label, node.aligned_label());
    }
    out.push_str("Adjacency list:\n");
    adjacency_lines(graph, &mut out, |n| n.label.clone(), |e| format!("{:.2}", e.distance));
    out
}

impl SubgraphPattern {
    /// Identifier, support and the pattern's adjacency list.
    pub fn general_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "ID:{}", self.id());
        let _ = writeln!(out, "Support:{}", self.support_count());
        let _ = writeln!(out, "Where:{}", quoted_list(&self.support_ids()));
        out.push_str("Adjacency list:\n");
        adjacency_lines(
            self.graph(),
            &mut out,
            |n| format!("{}{}", n.label, n.name),
            |e| e.num_label.to_string(),
        );
        out
    }

    /// General report followed by every occurrence, grouped by the active
    /// clustering option.
    ///
    /// A group member without an occurrence is an `UnknownOccurrence` error.
    pub fn full_report(&self) -> Result<String> {
        let mut out = self.general_report();
        if self.occurrence_count() == 0 {
            out.push_str(MISSING_RUN_MESSAGE);
            out.push('\n');
            return Ok(out);
        }

        let _ = writeln!(
            out,
            "{} subgraphs matching this pattern were found.",
            self.occurrence_count()
        );
        let _ = writeln!(out, "Graphs are classified based on {} similarity.\n", self.clustering());

        for (group, members) in self.groups() {
            let _ = writeln!(out, "Group {}: {} members\n{}", group, members.len(), GROUP_RULE);
            for id in members {
                out.push_str(&occurrence_report(self.occurrence(id)?));
                out.push('\n');
            }
        }
        Ok(out)
    }
}
