//! Subgraph pattern aggregate.
//!
//! A `SubgraphPattern` owns one pattern graph and the structures it was
//! mined from. [`SubgraphPattern::find_protein_subgraphs`] locates every
//! embedding of the pattern in each supporting structure, drops redundant
//! embeddings per structure, ranks the survivors by total edge weight and
//! groups them by sequence and structural similarity.

use crate::clustering::{ClusterBuilder, Clustering, Groups};
use crate::dedup::{deduplicate, Deduplicated};
use crate::identity::{self, PatternKey};
use crate::matcher::find_monomorphisms;
use crate::occurrence::Occurrence;
use crate::similarity::Support;
use emap_core::{
    ClusteringOption, EmapError, HostStructure, MiningConfig, ResidueGraph, Result,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Results of one discovery run
#[derive(Debug, Clone, Default)]
struct Discovery {
    /// Embeddings found per structure before deduplication
    total_support: BTreeMap<String, usize>,
    /// Deduplicated occurrences in rank order
    occurrences: Vec<Occurrence>,
    by_id: HashMap<String, usize>,
    clustering: Clustering,
}

/// A recurring residue motif and its occurrences across structures
#[derive(Debug, Clone)]
pub struct SubgraphPattern {
    graph: ResidueGraph,
    canonical: String,
    id: String,
    file_id: String,
    key: PatternKey,
    support: Support,
    config: MiningConfig,
    option: ClusteringOption,
    discovery: Discovery,
}

impl SubgraphPattern {
    /// Creates a pattern with the default mining configuration.
    ///
    /// `index` is the pattern's 0-based position in its mining run; the
    /// identifier carries `index + 1`.
    pub fn new<I>(graph: ResidueGraph, index: usize, support: I) -> Self
    where
        I: IntoIterator<Item = Arc<HostStructure>>,
    {
        Self::with_config(graph, index, support, MiningConfig::default())
    }

    pub fn with_config<I>(
        mut graph: ResidueGraph,
        index: usize,
        support: I,
        config: MiningConfig,
    ) -> Self
    where
        I: IntoIterator<Item = Arc<HostStructure>>,
    {
        let support: Support = support
            .into_iter()
            .map(|host| (host.id.clone(), host))
            .collect();

        let canonical = identity::canonical_form(&graph);
        let id = identity::identifier(index, &canonical, support.len());
        let file_id = identity::file_safe(&id);
        identity::escape_reserved_labels(&mut graph);
        let key = PatternKey::new(&graph, canonical.clone(), support.len());

        Self {
            graph,
            canonical,
            id,
            file_id,
            key,
            support,
            option: config.clustering,
            config,
            discovery: Discovery::default(),
        }
    }

    /// Finds, deduplicates, ranks and clusters the pattern's occurrences.
    ///
    /// Recomputes from scratch on every call. On error the previous results
    /// are kept unchanged.
    pub fn find_protein_subgraphs(&mut self, option: ClusteringOption) -> Result<()> {
        if self.support.is_empty() {
            log::warn!("Pattern {} has no supporting structures", self.id);
        }

        let mut total_support = BTreeMap::new();
        let mut pool: Vec<Occurrence> = Vec::new();
        for (structure_id, host) in &self.support {
            let embeddings = find_monomorphisms(&host.graph, &self.graph)
                .map(|mapping| Occurrence::build(&mapping, host, &self.graph))
                .collect::<Result<Vec<_>>>()?;
            let Deduplicated { survivors, found } = deduplicate(embeddings);
            log::debug!(
                "{}: {} embeddings of {}, {} after deduplication",
                structure_id,
                found,
                self.id,
                survivors.len()
            );
            total_support.insert(structure_id.clone(), found);
            pool.extend(survivors);
        }

        pool.sort_by(|a, b| a.total_weight().total_cmp(&b.total_weight()));
        for (rank, occurrence) in pool.iter_mut().enumerate() {
            occurrence.assign_id(rank + 1);
        }

        let clustering =
            ClusterBuilder::new(&self.support, &self.config, self.graph.node_count()).build(&pool)?;

        let by_id = pool
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id().to_string(), i))
            .collect();

        log::info!(
            "Pattern {}: {} occurrences in {} structures, {} structural / {} sequence groups",
            self.id,
            pool.len(),
            self.support.len(),
            clustering.structural.len(),
            clustering.sequence.len()
        );

        self.discovery = Discovery {
            total_support,
            occurrences: pool,
            by_id,
            clustering,
        };
        self.option = option;
        Ok(())
    }

    /// Switches the active grouping by name (`structural` or `sequence`).
    pub fn set_clustering(&mut self, option: &str) -> Result<()> {
        let option: ClusteringOption = option.parse()?;
        self.select_clustering(option);
        Ok(())
    }

    pub fn select_clustering(&mut self, option: ClusteringOption) {
        self.option = option;
    }

    pub fn clustering(&self) -> ClusteringOption {
        self.option
    }

    /// Groups under the active clustering option.
    pub fn groups(&self) -> &Groups {
        match self.option {
            ClusteringOption::Structural => &self.discovery.clustering.structural,
            ClusteringOption::Sequence => &self.discovery.clustering.sequence,
        }
    }

    pub fn structural_groups(&self) -> &Groups {
        &self.discovery.clustering.structural
    }

    pub fn sequence_groups(&self) -> &Groups {
        &self.discovery.clustering.sequence
    }

    pub fn occurrence(&self, id: &str) -> Result<&Occurrence> {
        self.discovery
            .by_id
            .get(id)
            .map(|&i| &self.discovery.occurrences[i])
            .ok_or_else(|| EmapError::UnknownOccurrence(id.to_string()))
    }

    /// Occurrences in rank order (ascending total edge weight).
    pub fn occurrences(&self) -> &[Occurrence] {
        &self.discovery.occurrences
    }

    pub fn occurrence_count(&self) -> usize {
        self.discovery.occurrences.len()
    }

    /// Embeddings found per structure before deduplication.
    pub fn total_support(&self) -> &BTreeMap<String, usize> {
        &self.discovery.total_support
    }

    pub fn support_ids(&self) -> Vec<&str> {
        self.support.keys().map(String::as_str).collect()
    }

    pub fn support_count(&self) -> usize {
        self.support.len()
    }

    pub fn host(&self, id: &str) -> Result<&HostStructure> {
        self.support
            .get(id)
            .map(|h| h.as_ref())
            .ok_or_else(|| EmapError::UnknownStructure(id.to_string()))
    }

    /// Pattern graph, with reserved labels escaped.
    pub fn graph(&self) -> &ResidueGraph {
        &self.graph
    }

    pub fn canonical_form(&self) -> &str {
        &self.canonical
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn config(&self) -> &MiningConfig {
        &self.config
    }

    pub fn key(&self) -> &PatternKey {
        &self.key
    }

    /// Replaces the leading index of the identifier.
    pub fn update_index(&mut self, index: usize) {
        self.id = identity::reindex(&self.id, index);
        self.file_id = identity::file_safe(&self.id);
    }
}

impl PartialEq for SubgraphPattern {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SubgraphPattern {}

impl PartialOrd for SubgraphPattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SubgraphPattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
