//! Per-host removal of redundant embeddings.
//!
//! Automorphisms of a pattern yield several mappings onto the same host
//! residues. Two occurrences are treated as the same when every residue has
//! the same degree in both, which is what the degree signature captures.

use crate::occurrence::Occurrence;
use std::collections::HashSet;

/// Sorted `(node name, degree)` pairs of an occurrence graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DegreeSignature(Vec<(String, usize)>);

impl DegreeSignature {
    pub fn of(occurrence: &Occurrence) -> Self {
        let graph = occurrence.graph();
        let mut pairs: Vec<(String, usize)> = graph
            .node_indices()
            .map(|idx| (graph.node(idx).name.clone(), graph.degree(idx)))
            .collect();
        pairs.sort();
        DegreeSignature(pairs)
    }
}

/// Result of deduplicating one host's occurrences.
#[derive(Debug, Clone)]
pub struct Deduplicated {
    /// First occurrence of each signature, in discovery order
    pub survivors: Vec<Occurrence>,
    /// Number of embeddings seen before deduplication
    pub found: usize,
}

/// Keeps the first occurrence per degree signature.
pub fn deduplicate<I>(occurrences: I) -> Deduplicated
where
    I: IntoIterator<Item = Occurrence>,
{
    let mut seen: HashSet<DegreeSignature> = HashSet::new();
    let mut survivors = Vec::new();
    let mut found = 0;
    for occurrence in occurrences {
        found += 1;
        if seen.insert(DegreeSignature::of(&occurrence)) {
            survivors.push(occurrence);
        }
    }
    Deduplicated { survivors, found }
}
