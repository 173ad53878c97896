//! Mining configuration.
//!
//! Serde-based TOML configuration with the clustering thresholds and the
//! default clustering view.

use crate::errors::{EmapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which similarity grouping a pattern exposes as its active `groups`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringOption {
    /// 3-D similarity (superposition RMSD)
    #[default]
    Structural,
    /// Aligned sequence-position proximity
    Sequence,
}

impl ClusteringOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringOption::Structural => "structural",
            ClusteringOption::Sequence => "sequence",
        }
    }
}

impl fmt::Display for ClusteringOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusteringOption {
    type Err = EmapError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "structural" => Ok(ClusteringOption::Structural),
            "sequence" => Ok(ClusteringOption::Sequence),
            other => Err(EmapError::invalid_option(other)),
        }
    }
}

/// Clustering thresholds and execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    /// Two occurrences are structurally similar when their best RMSD is
    /// at most this value (inclusive, Å)
    #[serde(default = "default_rmsd_threshold")]
    pub rmsd_threshold: f64,

    /// Two occurrences are sequence-similar when their best sequence
    /// distance is strictly below this value. `None` uses the pattern's
    /// node count.
    #[serde(default)]
    pub sequence_threshold: Option<u64>,

    /// Evaluate occurrence pairs on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Grouping exposed after discovery
    #[serde(default)]
    pub clustering: ClusteringOption,
}

fn default_rmsd_threshold() -> f64 {
    0.5
}

fn default_parallel() -> bool {
    true
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            rmsd_threshold: default_rmsd_threshold(),
            sequence_threshold: None,
            parallel: default_parallel(),
            clustering: ClusteringOption::default(),
        }
    }
}

impl MiningConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: MiningConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rmsd_threshold.is_finite() || self.rmsd_threshold < 0.0 {
            return Err(EmapError::config(format!(
                "rmsd_threshold must be finite and non-negative, got {}",
                self.rmsd_threshold
            )));
        }
        if self.sequence_threshold == Some(0) {
            return Err(EmapError::config(
                "sequence_threshold of 0 can never be satisfied (strict comparison)",
            ));
        }
        Ok(())
    }

    /// Sequence threshold for a pattern with `node_count` nodes.
    pub fn sequence_threshold_for(&self, node_count: usize) -> u64 {
        self.sequence_threshold.unwrap_or(node_count as u64)
    }
}
