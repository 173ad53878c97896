//! Dataset loading for the `emap-mine` driver.
//!
//! A dataset is one JSON document holding the host structures and the
//! mined patterns, each pattern listing the ids of the structures it was
//! found in:
//!
//! ```json
//! {
//!   "structures": [{"id": "1u3d", "graph": {...}, "residues": {...}}],
//!   "patterns":   [{"graph": {...}, "support": ["1u3d"]}]
//! }
//! ```

use anyhow::{bail, Context, Result};
use emap_core::{HostStructure, MiningConfig, ResidueGraph};
use emap_mining::SubgraphPattern;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct Dataset {
    pub structures: Vec<HostStructure>,
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
}

/// One mined pattern and the ids of its supporting structures
#[derive(Debug, Deserialize)]
pub struct PatternEntry {
    pub graph: ResidueGraph,
    pub support: Vec<String>,
}

impl Dataset {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut dataset: Dataset =
            serde_json::from_str(content).context("Malformed dataset JSON")?;
        for structure in &mut dataset.structures {
            if structure.graph.id().is_empty() {
                let id = structure.id.clone();
                structure.graph.set_id(id);
            }
        }
        Ok(dataset)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to load dataset {}", path.display()))
    }

    /// Validates every structure and builds the patterns, ranked in
    /// descending order with their indices reassigned to match.
    pub fn into_patterns(self, config: &MiningConfig) -> Result<Vec<SubgraphPattern>> {
        let mut hosts: BTreeMap<String, Arc<HostStructure>> = BTreeMap::new();
        for structure in self.structures {
            structure
                .validate()
                .with_context(|| format!("Invalid structure '{}'", structure.id))?;
            if hosts.contains_key(&structure.id) {
                bail!("Duplicate structure id '{}'", structure.id);
            }
            hosts.insert(structure.id.clone(), Arc::new(structure));
        }
        log::info!("Loaded {} host structures", hosts.len());

        let mut patterns = Vec::with_capacity(self.patterns.len());
        for (index, entry) in self.patterns.into_iter().enumerate() {
            let support = entry
                .support
                .iter()
                .map(|id| {
                    hosts.get(id).cloned().with_context(|| {
                        format!("Pattern {} references unknown structure '{}'", index + 1, id)
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            patterns.push(SubgraphPattern::with_config(
                entry.graph,
                index,
                support,
                config.clone(),
            ));
        }

        patterns.sort_by(|a, b| b.cmp(a));
        for (index, pattern) in patterns.iter_mut().enumerate() {
            pattern.update_index(index);
        }
        log::info!("Ranked {} patterns", patterns.len());
        Ok(patterns)
    }
}
