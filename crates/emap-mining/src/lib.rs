//! # emap-mining
//!
//! Occurrence discovery and clustering for recurring residue motifs.
//!
//! Given a small pattern graph and the structures it was mined from, a
//! [`SubgraphPattern`] finds every embedding of the pattern in each
//! structure, removes redundant embeddings and groups the rest by aligned
//! sequence position and by 3-D superposition RMSD.
//!
//! ## Pipeline
//! ```text
//! matcher ──► occurrence ──► dedup ──► rank/ids ──► clustering
//!                                                      │
//!                                    similarity ◄──────┘
//!                                        │
//!                                  superposition
//! ```
//!
//! Reports, DOT export and viewer metadata are read-only views over a
//! pattern's discovery results.

pub mod clustering;
pub mod dedup;
pub mod identity;
pub mod matcher;
pub mod occurrence;
pub mod pattern;
pub mod report;
pub mod similarity;
pub mod superposition;
pub mod visualize;

// Re-export commonly used items
pub use clustering::{ClusterBuilder, Clustering, Groups};
pub use identity::{canonical_form, PatternKey};
pub use matcher::{find_isomorphisms, find_monomorphisms, NodeMapping};
pub use occurrence::Occurrence;
pub use pattern::SubgraphPattern;
pub use similarity::{PairSimilarity, SimilarityEvaluator, Support};
pub use superposition::{superimpose, superposition_rmsd, Superposition};
pub use visualize::{DrawableGraph, ViewerSelection};

pub mod prelude {
    pub use crate::pattern::SubgraphPattern;
    pub use crate::similarity::Support;
    pub use emap_core::{ClusteringOption, EmapError, HostStructure, MiningConfig, ResidueGraph};
}
