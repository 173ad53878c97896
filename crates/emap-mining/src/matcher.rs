//! Subgraph monomorphism and graph isomorphism enumeration.
//!
//! Depth-first VF2-style search over residue graphs. Query nodes are visited
//! in a connectivity-first order so every node after the first of its
//! component is anchored to an already-mapped neighbor; candidates are then
//! drawn from that neighbor's image instead of the whole target graph.
//!
//! Matches are produced lazily. The iterator is not cached: calling
//! [`find_monomorphisms`] or [`find_isomorphisms`] again restarts the search.

use emap_core::{ContactEdge, ResidueGraph, ResidueNode};
use petgraph::graph::NodeIndex;
use std::iter::FusedIterator;

/// `(query node, target node)` pairs listed in query insertion order.
pub type NodeMapping = Vec<(NodeIndex, NodeIndex)>;

pub type NodeMatchFn = fn(&ResidueNode, &ResidueNode) -> bool;
pub type EdgeMatchFn = fn(&ContactEdge, &ContactEdge) -> bool;

/// Matcher with the default numeric-label compatibility predicates.
pub type DefaultMatches<'a> = Matches<'a, NodeMatchFn, EdgeMatchFn>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Every query edge maps onto a target edge; the target may carry extra
    /// edges and nodes.
    Monomorphism,
    /// Edge-exact bijection between graphs of equal size.
    Isomorphism,
}

/// Default node compatibility: equal numeric labels.
pub fn numeric_node_match(query: &ResidueNode, target: &ResidueNode) -> bool {
    query.num_label == target.num_label
}

/// Default edge compatibility: equal threshold classes.
pub fn numeric_edge_match(query: &ContactEdge, target: &ContactEdge) -> bool {
    query.num_label == target.num_label
}

/// Enumerates embeddings of `pattern` into `host` (pattern → host).
pub fn find_monomorphisms<'a>(
    host: &'a ResidueGraph,
    pattern: &'a ResidueGraph,
) -> DefaultMatches<'a> {
    Matches::new(
        pattern,
        host,
        MatchMode::Monomorphism,
        numeric_node_match as NodeMatchFn,
        numeric_edge_match as EdgeMatchFn,
    )
}

/// Monomorphism search with caller-supplied compatibility predicates,
/// called as `node_match(pattern_node, host_node)`.
pub fn find_monomorphisms_with<'a, FN, FE>(
    host: &'a ResidueGraph,
    pattern: &'a ResidueGraph,
    node_match: FN,
    edge_match: FE,
) -> Matches<'a, FN, FE>
where
    FN: Fn(&ResidueNode, &ResidueNode) -> bool,
    FE: Fn(&ContactEdge, &ContactEdge) -> bool,
{
    Matches::new(pattern, host, MatchMode::Monomorphism, node_match, edge_match)
}

/// Enumerates isomorphisms `g1 → g2`.
pub fn find_isomorphisms<'a>(g1: &'a ResidueGraph, g2: &'a ResidueGraph) -> DefaultMatches<'a> {
    Matches::new(
        g1,
        g2,
        MatchMode::Isomorphism,
        numeric_node_match as NodeMatchFn,
        numeric_edge_match as EdgeMatchFn,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchState {
    Fresh,
    Running,
    /// Query graph is empty: exactly one (empty) mapping
    EmptyPending,
    Done,
}

#[derive(Debug, Clone)]
struct Frame {
    candidates: Vec<NodeIndex>,
    cursor: usize,
    assigned: Option<NodeIndex>,
}

/// Lazy mapping iterator.
pub struct Matches<'a, FN, FE> {
    query: &'a ResidueGraph,
    target: &'a ResidueGraph,
    mode: MatchMode,
    node_match: FN,
    edge_match: FE,
    order: Vec<NodeIndex>,
    anchors: Vec<Option<NodeIndex>>,
    query_map: Vec<Option<NodeIndex>>,
    target_map: Vec<Option<NodeIndex>>,
    frames: Vec<Frame>,
    state: SearchState,
}

impl<'a, FN, FE> Matches<'a, FN, FE>
where
    FN: Fn(&ResidueNode, &ResidueNode) -> bool,
    FE: Fn(&ContactEdge, &ContactEdge) -> bool,
{
    pub fn new(
        query: &'a ResidueGraph,
        target: &'a ResidueGraph,
        mode: MatchMode,
        node_match: FN,
        edge_match: FE,
    ) -> Self {
        let (order, anchors) = search_order(query);

        let state = if mode == MatchMode::Isomorphism
            && (query.node_count() != target.node_count()
                || query.edge_count() != target.edge_count())
        {
            SearchState::Done
        } else if query.node_count() > target.node_count() {
            SearchState::Done
        } else if query.is_empty() {
            SearchState::EmptyPending
        } else {
            SearchState::Fresh
        };

        Self {
            query,
            target,
            mode,
            node_match,
            edge_match,
            order,
            anchors,
            query_map: vec![None; query.node_count()],
            target_map: vec![None; target.node_count()],
            frames: Vec::new(),
            state,
        }
    }

    fn push_frame(&mut self, depth: usize) {
        let candidates = match self.anchors[depth].and_then(|a| self.query_map[a.index()]) {
            Some(anchor_image) => self.target.neighbors(anchor_image),
            None => self.target.node_indices().collect(),
        };
        self.frames.push(Frame {
            candidates,
            cursor: 0,
            assigned: None,
        });
    }

    fn next_candidate(&mut self, depth: usize) -> Option<NodeIndex> {
        let query_node = self.order[depth];
        loop {
            let candidate = {
                let frame = &mut self.frames[depth];
                let candidate = *frame.candidates.get(frame.cursor)?;
                frame.cursor += 1;
                candidate
            };
            if self.is_feasible(query_node, candidate) {
                return Some(candidate);
            }
        }
    }

    fn is_feasible(&self, q: NodeIndex, t: NodeIndex) -> bool {
        if self.target_map[t.index()].is_some() {
            return false;
        }
        if !(self.node_match)(self.query.node(q), self.target.node(t)) {
            return false;
        }

        let (q_degree, t_degree) = (self.query.degree(q), self.target.degree(t));
        match self.mode {
            MatchMode::Monomorphism if t_degree < q_degree => return false,
            MatchMode::Isomorphism if t_degree != q_degree => return false,
            _ => {}
        }

        for q_neighbor in self.query.neighbors(q) {
            let Some(t_neighbor) = self.query_map[q_neighbor.index()] else {
                continue;
            };
            let (Some(q_edge), Some(t_edge)) = (
                self.query.edge_between(q, q_neighbor),
                self.target.edge_between(t, t_neighbor),
            ) else {
                return false;
            };
            if !(self.edge_match)(q_edge, t_edge) {
                return false;
            }
        }

        if self.mode == MatchMode::Isomorphism {
            for t_neighbor in self.target.neighbors(t) {
                if let Some(q_neighbor) = self.target_map[t_neighbor.index()] {
                    if !self.query.has_edge(q, q_neighbor) {
                        return false;
                    }
                }
            }
        }

        true
    }

    fn assign(&mut self, depth: usize, t: NodeIndex) {
        let q = self.order[depth];
        self.query_map[q.index()] = Some(t);
        self.target_map[t.index()] = Some(q);
        self.frames[depth].assigned = Some(t);
    }

    fn unassign(&mut self, depth: usize) {
        if let Some(t) = self.frames[depth].assigned.take() {
            let q = self.order[depth];
            self.query_map[q.index()] = None;
            self.target_map[t.index()] = None;
        }
    }

    fn current_mapping(&self) -> NodeMapping {
        self.query
            .node_indices()
            .filter_map(|q| self.query_map[q.index()].map(|t| (q, t)))
            .collect()
    }
}

impl<'a, FN, FE> Iterator for Matches<'a, FN, FE>
where
    FN: Fn(&ResidueNode, &ResidueNode) -> bool,
    FE: Fn(&ContactEdge, &ContactEdge) -> bool,
{
    type Item = NodeMapping;

    fn next(&mut self) -> Option<NodeMapping> {
        match self.state {
            SearchState::Done => return None,
            SearchState::EmptyPending => {
                self.state = SearchState::Done;
                return Some(Vec::new());
            }
            SearchState::Fresh => {
                self.push_frame(0);
                self.state = SearchState::Running;
            }
            SearchState::Running => {}
        }

        loop {
            let depth = self.frames.len() - 1;
            self.unassign(depth);

            match self.next_candidate(depth) {
                Some(t) => {
                    self.assign(depth, t);
                    if depth + 1 == self.order.len() {
                        return Some(self.current_mapping());
                    }
                    self.push_frame(depth + 1);
                }
                None => {
                    self.frames.pop();
                    if self.frames.is_empty() {
                        self.state = SearchState::Done;
                        return None;
                    }
                }
            }
        }
    }
}

impl<'a, FN, FE> FusedIterator for Matches<'a, FN, FE>
where
    FN: Fn(&ResidueNode, &ResidueNode) -> bool,
    FE: Fn(&ContactEdge, &ContactEdge) -> bool,
{
}

/// Connectivity-first visiting order and, per position, an earlier-placed
/// neighbor to draw candidates from.
fn search_order(query: &ResidueGraph) -> (Vec<NodeIndex>, Vec<Option<NodeIndex>>) {
    let n = query.node_count();
    let mut position: Vec<Option<usize>> = vec![None; n];
    let mut order = Vec::with_capacity(n);

    while order.len() < n {
        let placed_neighbors = |q: NodeIndex| {
            query
                .neighbors(q)
                .into_iter()
                .filter(|nb| position[nb.index()].is_some())
                .count()
        };
        // max connections to placed nodes, then max degree, then lowest index
        let next = query
            .node_indices()
            .filter(|q| position[q.index()].is_none())
            .max_by(|&a, &b| {
                (placed_neighbors(a), query.degree(a))
                    .cmp(&(placed_neighbors(b), query.degree(b)))
                    .then(b.index().cmp(&a.index()))
            });
        let Some(next) = next else { break };
        position[next.index()] = Some(order.len());
        order.push(next);
    }

    let anchors = order
        .iter()
        .enumerate()
        .map(|(depth, &q)| {
            query
                .neighbors(q)
                .into_iter()
                .filter(|nb| position[nb.index()].map_or(false, |p| p < depth))
                .min_by_key(|nb| position[nb.index()])
        })
        .collect();

    (order, anchors)
}
