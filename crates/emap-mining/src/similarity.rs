//! Pairwise occurrence similarity.
//!
//! For two occurrences every isomorphism between their graphs is scored by
//! aligned-sequence distance and by superposition RMSD of one representative
//! atom per residue pair; both scores are minimized independently over all
//! isomorphisms.

use crate::matcher::{find_isomorphisms, NodeMapping};
use crate::occurrence::Occurrence;
use crate::superposition::superposition_rmsd;
use emap_core::{EmapError, HostStructure, Residue, Result, ALPHA_CARBON};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Host structures keyed by id.
pub type Support = BTreeMap<String, Arc<HostStructure>>;

/// Best scores between two occurrences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSimilarity {
    /// Minimum sequence distance; `None` when the graphs are not isomorphic
    pub sequence_distance: Option<u64>,
    /// Minimum RMSD; +∞ when no isomorphism gives a determined superposition
    pub rmsd: f64,
    /// Number of isomorphisms examined
    pub mappings: usize,
}

impl PairSimilarity {
    pub fn unrelated() -> Self {
        Self {
            sequence_distance: None,
            rmsd: f64::INFINITY,
            mappings: 0,
        }
    }

    /// Strict: distance must be below the threshold.
    pub fn is_sequence_similar(&self, threshold: u64) -> bool {
        self.sequence_distance.map_or(false, |d| d < threshold)
    }

    /// Inclusive: RMSD at the threshold still counts.
    pub fn is_structurally_similar(&self, threshold: f64) -> bool {
        self.rmsd <= threshold
    }
}

/// Coordinates used to superimpose one residue pair.
///
/// Alpha carbons when both residues have one, otherwise the first atom of
/// `first` whose name also occurs in `second`.
pub fn reference_pair(first: &Residue, second: &Residue) -> Option<([f64; 3], [f64; 3])> {
    if let (Some(a), Some(b)) = (first.atom(ALPHA_CARBON), second.atom(ALPHA_CARBON)) {
        return Some((a.coord, b.coord));
    }
    first
        .atoms
        .iter()
        .find_map(|a| second.atom(&a.name).map(|b| (a.coord, b.coord)))
}

/// Σ |aligned(n1) − aligned(n2)| over mapped pairs where both are aligned.
pub fn sequence_distance(first: &Occurrence, second: &Occurrence, mapping: &NodeMapping) -> u64 {
    mapping
        .iter()
        .filter_map(|&(a, b)| {
            let pa = first.graph().node(a).aligned_resnum?;
            let pb = second.graph().node(b).aligned_resnum?;
            Some(pa.abs_diff(pb))
        })
        .sum()
}

/// Superposition RMSD of the representative atoms under `mapping`.
pub fn mapping_rmsd(
    first: &Occurrence,
    first_host: &HostStructure,
    second: &Occurrence,
    second_host: &HostStructure,
    mapping: &NodeMapping,
) -> Result<f64> {
    let mut coords_first = Vec::with_capacity(mapping.len());
    let mut coords_second = Vec::with_capacity(mapping.len());
    for &(a, b) in mapping {
        let res_a = first_host.residue(&first.graph().node(a).name)?;
        let res_b = second_host.residue(&second.graph().node(b).name)?;
        match reference_pair(res_a, res_b) {
            Some((ca, cb)) => {
                coords_first.push(ca);
                coords_second.push(cb);
            }
            None => return Ok(f64::INFINITY),
        }
    }
    Ok(superposition_rmsd(&coords_first, &coords_second))
}

/// Scores occurrence pairs against the structures they came from.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityEvaluator<'a> {
    support: &'a Support,
}

impl<'a> SimilarityEvaluator<'a> {
    pub fn new(support: &'a Support) -> Self {
        Self { support }
    }

    fn host(&self, id: &str) -> Result<&'a HostStructure> {
        self.support
            .get(id)
            .map(|h| h.as_ref())
            .ok_or_else(|| EmapError::UnknownStructure(id.to_string()))
    }

    /// Minimum sequence distance and minimum RMSD over all isomorphisms.
    pub fn evaluate(&self, first: &Occurrence, second: &Occurrence) -> Result<PairSimilarity> {
        let first_host = self.host(first.structure_id())?;
        let second_host = self.host(second.structure_id())?;

        let mut best = PairSimilarity::unrelated();
        for mapping in find_isomorphisms(first.graph(), second.graph()) {
            best.mappings += 1;
            let distance = sequence_distance(first, second, &mapping);
            best.sequence_distance =
                Some(best.sequence_distance.map_or(distance, |d| d.min(distance)));
            let rmsd = mapping_rmsd(first, first_host, second, second_host, &mapping)?;
            best.rmsd = best.rmsd.min(rmsd);
        }
        Ok(best)
    }
}
