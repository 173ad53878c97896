//! Two-metric grouping of a pattern's occurrence pool.
//!
//! Every occurrence pair is scored once; two thresholded similarity graphs
//! (sequence and structural) are built over pool indices and their connected
//! components become the groups, largest first.

use crate::occurrence::Occurrence;
use crate::similarity::{PairSimilarity, SimilarityEvaluator, Support};
use emap_core::{MiningConfig, Result};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Group id (1 = largest) → member occurrence ids.
pub type Groups = BTreeMap<usize, Vec<String>>;

/// Groupings of one occurrence pool under both metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clustering {
    pub structural: Groups,
    pub sequence: Groups,
}

/// Scored pair of pool indices (`first < second`)
#[derive(Debug, Clone, Copy)]
pub struct ScoredPair {
    pub first: usize,
    pub second: usize,
    pub similarity: PairSimilarity,
}

/// Connected components of the graph on `0..n` with the given edges.
///
/// Components are discovered from the lowest unvisited index, members are
/// listed in ascending order, and the result is stably sorted by size,
/// largest first.
pub fn cluster_pairs<I>(n: usize, edges: I) -> Vec<Vec<usize>>
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut graph: UnGraph<usize, ()> = UnGraph::with_capacity(n, 0);
    for i in 0..n {
        graph.add_node(i);
    }
    for (a, b) in edges {
        graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }

    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for start in graph.node_indices() {
        if visited[start.index()] {
            continue;
        }
        let mut members = Vec::new();
        let mut bfs = Bfs::new(&graph, start);
        while let Some(node) = bfs.next(&graph) {
            visited[node.index()] = true;
            members.push(graph[node]);
        }
        members.sort_unstable();
        components.push(members);
    }

    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

/// Numbers components from 1 and maps pool indices to occurrence ids.
pub fn to_groups(components: Vec<Vec<usize>>, pool: &[Occurrence]) -> Groups {
    components
        .into_iter()
        .enumerate()
        .map(|(i, members)| {
            let ids = members.into_iter().map(|m| pool[m].id().to_string()).collect();
            (i + 1, ids)
        })
        .collect()
}

/// Pairwise clustering of one occurrence pool.
#[derive(Debug, Clone)]
pub struct ClusterBuilder<'a> {
    evaluator: SimilarityEvaluator<'a>,
    rmsd_threshold: f64,
    sequence_threshold: u64,
    parallel: bool,
}

impl<'a> ClusterBuilder<'a> {
    /// `node_count` is the pattern size, the default sequence threshold.
    pub fn new(support: &'a Support, config: &MiningConfig, node_count: usize) -> Self {
        Self {
            evaluator: SimilarityEvaluator::new(support),
            rmsd_threshold: config.rmsd_threshold,
            sequence_threshold: config.sequence_threshold_for(node_count),
            parallel: config.parallel,
        }
    }

    pub fn rmsd_threshold(&self) -> f64 {
        self.rmsd_threshold
    }

    pub fn sequence_threshold(&self) -> u64 {
        self.sequence_threshold
    }

    /// Scores every pair `i < j` of the pool.
    pub fn score_pairs(&self, pool: &[Occurrence]) -> Result<Vec<ScoredPair>> {
        let n = pool.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        let score = |&(i, j): &(usize, usize)| -> Result<ScoredPair> {
            Ok(ScoredPair {
                first: i,
                second: j,
                similarity: self.evaluator.evaluate(&pool[i], &pool[j])?,
            })
        };

        if self.parallel {
            pairs.par_iter().map(score).collect()
        } else {
            pairs.iter().map(score).collect()
        }
    }

    /// Groups the pool under both metrics.
    ///
    /// Pools of zero or one occurrence form a single group without any
    /// pairwise work.
    pub fn build(&self, pool: &[Occurrence]) -> Result<Clustering> {
        if pool.len() <= 1 {
            let all: Vec<String> = pool.iter().map(|o| o.id().to_string()).collect();
            let groups = Groups::from([(1, all)]);
            return Ok(Clustering {
                structural: groups.clone(),
                sequence: groups,
            });
        }

        let scored = self.score_pairs(pool)?;
        log_pair_statistics(&scored);

        let sequence_edges = scored
            .iter()
            .filter(|p| p.similarity.is_sequence_similar(self.sequence_threshold))
            .map(|p| (p.first, p.second));
        let structural_edges = scored
            .iter()
            .filter(|p| p.similarity.is_structurally_similar(self.rmsd_threshold))
            .map(|p| (p.first, p.second));

        let sequence = to_groups(cluster_pairs(pool.len(), sequence_edges), pool);
        let structural = to_groups(cluster_pairs(pool.len(), structural_edges), pool);

        log::debug!(
            "Clustered {} occurrences: {} structural groups (RMSD <= {}), {} sequence groups (distance < {})",
            pool.len(),
            structural.len(),
            self.rmsd_threshold,
            sequence.len(),
            self.sequence_threshold
        );

        Ok(Clustering {
            structural,
            sequence,
        })
    }
}

fn log_pair_statistics(scored: &[ScoredPair]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let distances: Vec<u64> = scored
        .iter()
        .filter_map(|p| p.similarity.sequence_distance)
        .collect();
    let rmsds: Vec<f64> = scored
        .iter()
        .map(|p| p.similarity.rmsd)
        .filter(|r| r.is_finite())
        .collect();
    let mean_distance = if distances.is_empty() {
        f64::NAN
    } else {
        distances.iter().sum::<u64>() as f64 / distances.len() as f64
    };
    let mean_rmsd = if rmsds.is_empty() {
        f64::NAN
    } else {
        rmsds.iter().sum::<f64>() / rmsds.len() as f64
    };
    log::debug!(
        "Scored {} pairs: mean sequence distance {:.2}, mean finite RMSD {:.3} ({} pairs undetermined)",
        scored.len(),
        mean_distance,
        mean_rmsd,
        scored.len() - rmsds.len()
    );
}
