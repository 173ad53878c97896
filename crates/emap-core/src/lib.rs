//! # emap-core
//!
//! Core types, configuration and errors for eMap subgraph-pattern mining.
//!
//! - **Graphs**: `ResidueGraph`, a name-indexed petgraph graph shared by
//!   pattern, host and occurrence graphs
//! - **Structures**: `HostStructure` with per-residue sequence, alignment and
//!   coordinate metadata
//! - **Config**: `MiningConfig` (TOML) and `ClusteringOption`
//! - **Errors**: `EmapError`

pub mod config;
pub mod errors;
pub mod graph;
pub mod structure;

pub use config::{ClusteringOption, MiningConfig};
pub use errors::{EmapError, Result};
pub use graph::{ContactEdge, EdgeRecord, GraphRecord, ResidueGraph, ResidueNode};
pub use structure::{Atom, HostStructure, Residue, ALPHA_CARBON};
