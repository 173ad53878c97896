//! Pattern identity: canonical form, identifiers and the pattern ordering key.
//!
//! The canonical form is a SMILES-like string computed from a canonical node
//! labeling, so two patterns that differ only by node naming get the same
//! string. Labeling proceeds by color refinement over (label, num_label) and
//! edge-class neighborhoods; remaining ties are broken by individualizing
//! each member of the first non-singleton cell and keeping the labeling with
//! the smallest adjacency certificate.

use emap_core::ResidueGraph;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;

/// Node label marking a non-protein cofactor.
pub const RESERVED_LABEL: &str = "#";

/// Replacement for [`RESERVED_LABEL`] in node labels and file names.
pub const ESCAPED_LABEL: &str = "NP";

/// `{index+1}_{canonical}_{support}`
pub fn identifier(index: usize, canonical: &str, support: usize) -> String {
    format!("{}_{}_{}", index + 1, canonical, support)
}

/// Identifier usable as a file name stem.
pub fn file_safe(id: &str) -> String {
    id.replace(RESERVED_LABEL, ESCAPED_LABEL)
}

/// Swaps the leading `{index+1}` of an identifier, keeping the rest.
pub fn reindex(id: &str, index: usize) -> String {
    match id.find('_') {
        Some(pos) => format!("{}{}", index + 1, &id[pos..]),
        None => (index + 1).to_string(),
    }
}

/// Rewrites reserved `#` node labels to `NP`.
pub fn escape_reserved_labels(graph: &mut ResidueGraph) {
    let reserved: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|&idx| graph.node(idx).label == RESERVED_LABEL)
        .collect();
    for idx in reserved {
        graph.node_mut(idx).label = ESCAPED_LABEL.to_string();
    }
}

/// Sort key of a pattern.
///
/// Field order is the comparison order: support count, canonical form,
/// weighted size, then the labeled structure signature. The last field only
/// separates patterns that are not equal as labeled graphs, so equality of
/// keys coincides with equality of the underlying graphs' canonical data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternKey {
    pub support: usize,
    pub canonical: String,
    pub weighted_size: u64,
    pub signature: String,
}

impl PatternKey {
    pub fn new(graph: &ResidueGraph, canonical: String, support: usize) -> Self {
        Self {
            support,
            canonical,
            weighted_size: graph.weighted_size(),
            signature: graph.signature(),
        }
    }
}

// ============================================================================
// Canonical labeling
// ============================================================================

type Certificate = (Vec<(String, u32)>, Vec<(usize, usize, u32)>);

/// Relabel-invariant SMILES-like string of a graph.
pub fn canonical_form(graph: &ResidueGraph) -> String {
    if graph.is_empty() {
        return String::new();
    }
    let order = canonical_order(graph);
    SmilesWriter::new(graph, &order).write()
}

/// Nodes listed in canonical rank order.
pub fn canonical_order(graph: &ResidueGraph) -> Vec<NodeIndex> {
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    if nodes.is_empty() {
        return nodes;
    }

    let initial: Vec<(String, u32)> = nodes
        .iter()
        .map(|&idx| {
            let n = graph.node(idx);
            (n.label.clone(), n.num_label)
        })
        .collect();
    let mut colors = dense_ranks(&initial);
    refine(graph, &nodes, &mut colors);

    let mut best: Option<(Certificate, Vec<usize>)> = None;
    search(graph, &nodes, colors, &mut best);

    match best {
        Some((_, colors)) => {
            let mut order: Vec<(usize, NodeIndex)> =
                nodes.iter().map(|&idx| (colors[idx.index()], idx)).collect();
            order.sort();
            order.into_iter().map(|(_, idx)| idx).collect()
        }
        None => nodes,
    }
}

/// Maps each value to its rank among the distinct sorted values.
fn dense_ranks<T: Ord + Clone>(values: &[T]) -> Vec<usize> {
    let distinct: BTreeSet<T> = values.iter().cloned().collect();
    let rank: BTreeMap<&T, usize> = distinct.iter().enumerate().map(|(i, v)| (v, i)).collect();
    values.iter().map(|v| rank[v]).collect()
}

fn cell_count(colors: &[usize]) -> usize {
    colors.iter().collect::<BTreeSet<_>>().len()
}

/// Iterated neighborhood refinement until the partition stops splitting.
fn refine(graph: &ResidueGraph, nodes: &[NodeIndex], colors: &mut Vec<usize>) {
    let mut cells = cell_count(colors);
    loop {
        let signatures: Vec<(usize, Vec<(u32, usize)>)> = nodes
            .iter()
            .map(|&idx| {
                let mut around: Vec<(u32, usize)> = graph
                    .neighbors(idx)
                    .into_iter()
                    .filter_map(|nb| {
                        graph
                            .edge_between(idx, nb)
                            .map(|e| (e.num_label, colors[nb.index()]))
                    })
                    .collect();
                around.sort_unstable();
                (colors[idx.index()], around)
            })
            .collect();
        *colors = dense_ranks(&signatures);
        let refined = cell_count(colors);
        if refined == cells {
            return;
        }
        cells = refined;
    }
}

fn search(
    graph: &ResidueGraph,
    nodes: &[NodeIndex],
    colors: Vec<usize>,
    best: &mut Option<(Certificate, Vec<usize>)>,
) {
    let mut cell_sizes: HashMap<usize, usize> = HashMap::new();
    for &c in &colors {
        *cell_sizes.entry(c).or_default() += 1;
    }
    let target = cell_sizes
        .iter()
        .filter(|&(_, &size)| size > 1)
        .map(|(&color, _)| color)
        .min();

    let Some(target) = target else {
        let cert = certificate(graph, nodes, &colors);
        let better = best.as_ref().map_or(true, |(current, _)| cert < *current);
        if better {
            *best = Some((cert, colors));
        }
        return;
    };

    for &v in nodes.iter().filter(|idx| colors[idx.index()] == target) {
        let mut split: Vec<usize> = colors
            .iter()
            .enumerate()
            .map(|(i, &c)| if c > target || (c == target && i != v.index()) { c + 1 } else { c })
            .collect();
        refine(graph, nodes, &mut split);
        search(graph, nodes, split, best);
    }
}

fn certificate(graph: &ResidueGraph, nodes: &[NodeIndex], colors: &[usize]) -> Certificate {
    let mut labels: Vec<(usize, String, u32)> = nodes
        .iter()
        .map(|&idx| {
            let n = graph.node(idx);
            (colors[idx.index()], n.label.clone(), n.num_label)
        })
        .collect();
    labels.sort();

    let mut edges: Vec<(usize, usize, u32)> = graph
        .edges()
        .map(|(a, b, e)| {
            let (ca, cb) = (colors[a.index()], colors[b.index()]);
            (ca.min(cb), ca.max(cb), e.num_label)
        })
        .collect();
    edges.sort_unstable();

    (
        labels.into_iter().map(|(_, l, n)| (l, n)).collect(),
        edges,
    )
}

// ============================================================================
// SMILES-like output
// ============================================================================

fn bond_symbol(class: u32) -> String {
    match class {
        1 => "-".to_string(),
        2 => "=".to_string(),
        3 => "#".to_string(),
        4 => "$".to_string(),
        other => format!("{{{}}}", other),
    }
}

fn atom_symbol(label: &str) -> String {
    if label.chars().count() == 1 {
        label.to_string()
    } else {
        format!("[{}]", label)
    }
}

/// Depth-first writer over canonical ranks.
struct SmilesWriter<'a> {
    graph: &'a ResidueGraph,
    order: &'a [NodeIndex],
    /// adjacency by rank, sorted by neighbor rank
    adjacency: Vec<Vec<(usize, u32)>>,
    visited: Vec<bool>,
    children: Vec<Vec<(usize, u32)>>,
    /// ring-closure edges incident to each rank
    rings: Vec<Vec<(usize, u32)>>,
}

impl<'a> SmilesWriter<'a> {
    fn new(graph: &'a ResidueGraph, order: &'a [NodeIndex]) -> Self {
        let n = order.len();
        let mut rank = vec![0usize; graph.node_count()];
        for (r, idx) in order.iter().enumerate() {
            rank[idx.index()] = r;
        }
        let mut adjacency = vec![Vec::new(); n];
        for (a, b, e) in graph.edges() {
            let (ra, rb) = (rank[a.index()], rank[b.index()]);
            adjacency[ra].push((rb, e.num_label));
            adjacency[rb].push((ra, e.num_label));
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }
        Self {
            graph,
            order,
            adjacency,
            visited: vec![false; n],
            children: vec![Vec::new(); n],
            rings: vec![Vec::new(); n],
        }
    }

    fn write(mut self) -> String {
        let mut roots = Vec::new();
        for r in 0..self.order.len() {
            if !self.visited[r] {
                roots.push(r);
                self.explore(r, None);
            }
        }
        for list in &mut self.rings {
            list.sort_unstable();
        }

        let mut open: HashMap<(usize, usize), usize> = HashMap::new();
        let mut next_ring = 1usize;
        let parts: Vec<String> = roots
            .into_iter()
            .map(|root| {
                let mut out = String::new();
                self.emit(root, &mut out, &mut open, &mut next_ring);
                out
            })
            .collect();
        parts.join(".")
    }

    fn explore(&mut self, u: usize, parent: Option<usize>) {
        self.visited[u] = true;
        let neighbors = self.adjacency[u].clone();
        for (v, class) in neighbors {
            if Some(v) == parent {
                continue;
            }
            if self.visited[v] {
                // back edge, recorded once from the descendant side
                if !self.rings[u].iter().any(|&(w, _)| w == v) {
                    self.rings[u].push((v, class));
                    self.rings[v].push((u, class));
                }
            } else {
                self.children[u].push((v, class));
                self.explore(v, Some(u));
            }
        }
    }

    fn emit(
        &self,
        u: usize,
        out: &mut String,
        open: &mut HashMap<(usize, usize), usize>,
        next_ring: &mut usize,
    ) {
        out.push_str(&atom_symbol(&self.graph.node(self.order[u]).label));

        for &(v, class) in &self.rings[u] {
            let key = (u.min(v), u.max(v));
            match open.remove(&key) {
                Some(number) => {
                    let _ = write!(out, "%{}", number);
                }
                None => {
                    open.insert(key, *next_ring);
                    let _ = write!(out, "{}%{}", bond_symbol(class), next_ring);
                    *next_ring += 1;
                }
            }
        }

        let children = &self.children[u];
        for (i, &(v, class)) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            if !last {
                out.push('(');
            }
            out.push_str(&bond_symbol(class));
            self.emit(v, out, open, next_ring);
            if !last {
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emap_core::{ContactEdge, ResidueNode};

    fn graph(nodes: &[(&str, &str, u32)], edges: &[(&str, &str, u32)]) -> ResidueGraph {
        let mut g = ResidueGraph::new("g");
        for &(name, label, num) in nodes {
            g.add_node(ResidueNode::new(name, label, num));
        }
        for &(a, b, class) in edges {
            g.add_edge(a, b, ContactEdge::new(class)).unwrap();
        }
        g
    }

    #[test]
    fn test_invariant_under_relabeling() {
        let a = graph(
            &[("0", "W", 1), ("1", "Y", 2), ("2", "W", 1)],
            &[("0", "1", 1), ("1", "2", 2)],
        );
        let b = graph(
            &[("x", "W", 1), ("y", "W", 1), ("z", "Y", 2)],
            &[("y", "z", 1), ("z", "x", 2)],
        );
        assert_eq!(canonical_form(&a), canonical_form(&b));
    }

    #[test]
    fn test_distinguishes_edge_classes() {
        let a = graph(&[("0", "W", 1), ("1", "W", 1)], &[("0", "1", 1)]);
        let b = graph(&[("0", "W", 1), ("1", "W", 1)], &[("0", "1", 2)]);
        assert_eq!(canonical_form(&a), "W-W");
        assert_eq!(canonical_form(&b), "W=W");
    }

    #[test]
    fn test_ring_and_brackets() {
        let tri = graph(
            &[("0", "W", 1), ("1", "W", 1), ("2", "FAD", 5)],
            &[("0", "1", 1), ("1", "2", 1), ("0", "2", 1)],
        );
        let form = canonical_form(&tri);
        assert!(form.contains("[FAD]"));
        assert!(form.contains("%1"));
        assert_eq!(form.matches("%1").count(), 2);
    }

    #[test]
    fn test_branches_and_components() {
        let star = graph(
            &[("c", "Y", 2), ("a", "W", 1), ("b", "W", 1), ("d", "W", 1)],
            &[("c", "a", 1), ("c", "b", 1), ("c", "d", 1)],
        );
        let form = canonical_form(&star);
        assert_eq!(form.matches('(').count(), form.matches(')').count());
        assert!(form.contains('('));

        let split = graph(&[("0", "W", 1), ("1", "Y", 2)], &[]);
        assert!(canonical_form(&split).contains('.'));
    }

    #[test]
    fn test_symmetric_graph_is_stable() {
        // 4-cycle: every node is equivalent
        let a = graph(
            &[("0", "W", 1), ("1", "W", 1), ("2", "W", 1), ("3", "W", 1)],
            &[("0", "1", 1), ("1", "2", 1), ("2", "3", 1), ("3", "0", 1)],
        );
        let b = graph(
            &[("3", "W", 1), ("1", "W", 1), ("0", "W", 1), ("2", "W", 1)],
            &[("0", "2", 1), ("2", "1", 1), ("1", "3", 1), ("3", "0", 1)],
        );
        assert_eq!(canonical_form(&a), canonical_form(&b));
    }

    #[test]
    fn test_identifier_helpers() {
        let id = identifier(0, "W-#", 3);
        assert_eq!(id, "1_W-#_3");
        assert_eq!(file_safe(&id), "1_W-NP_3");
        assert_eq!(reindex(&id, 9), "10_W-#_3");
    }

    #[test]
    fn test_escape_reserved_labels() {
        let mut g = graph(&[("0", "#", 9), ("1", "W", 1)], &[("0", "1", 1)]);
        escape_reserved_labels(&mut g);
        assert_eq!(g.node_by_name("0").unwrap().label, ESCAPED_LABEL);
        assert_eq!(g.node_by_name("1").unwrap().label, "W");
    }

    #[test]
    fn test_key_order() {
        let g = graph(&[("0", "W", 1), ("1", "W", 1)], &[("0", "1", 1)]);
        let heavy = graph(&[("0", "W", 1), ("1", "W", 1)], &[("0", "1", 3)]);
        let low = PatternKey::new(&g, "A".into(), 2);
        let high_support = PatternKey::new(&g, "A".into(), 3);
        let later_form = PatternKey::new(&g, "B".into(), 2);
        let heavier = PatternKey::new(&heavy, "A".into(), 2);
        assert!(low < high_support);
        assert!(low < later_form);
        assert!(low < heavier);
        assert_eq!(low, PatternKey::new(&g, "A".into(), 2));
    }
}
