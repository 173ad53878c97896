//! Host structures: a residue graph plus per-residue metadata.

use crate::errors::{EmapError, Result};
use crate::graph::ResidueGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Alpha-carbon atom name, the preferred superposition reference.
pub const ALPHA_CARBON: &str = "CA";

/// Single atom with its coordinate (Å)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub name: String,
    pub coord: [f64; 3],
}

impl Atom {
    pub fn new(name: impl Into<String>, coord: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            coord,
        }
    }
}

/// Residue (or cofactor moiety) metadata attached to a graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Residue {
    /// Author sequence number
    pub seq_number: i64,

    /// Position in the multiple sequence alignment; `None` when not aligned
    #[serde(default)]
    pub aligned_residue_number: Option<i64>,

    /// Atoms in file order
    #[serde(default)]
    pub atoms: Vec<Atom>,

    /// Viewer selection expression, e.g. `[TRP]382:A.*`
    #[serde(default)]
    pub selection: String,

    /// Non-standard electron-transfer moiety (cofactor, ligand fragment)
    #[serde(default)]
    pub is_eta_moiety: bool,
}

impl Residue {
    pub fn new(seq_number: i64) -> Self {
        Self {
            seq_number,
            aligned_residue_number: None,
            atoms: Vec::new(),
            selection: String::new(),
            is_eta_moiety: false,
        }
    }

    pub fn with_aligned(mut self, aligned: i64) -> Self {
        self.aligned_residue_number = Some(aligned);
        self
    }

    pub fn with_atom(mut self, name: impl Into<String>, coord: [f64; 3]) -> Self {
        self.atoms.push(Atom::new(name, coord));
        self
    }

    pub fn with_selection(mut self, selection: impl Into<String>) -> Self {
        self.selection = selection.into();
        self
    }

    pub fn eta_moiety(mut self) -> Self {
        self.is_eta_moiety = true;
        self
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.name == name)
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atom(name).is_some()
    }

    pub fn first_atom(&self) -> Option<&Atom> {
        self.atoms.first()
    }
}

/// One structure searched for pattern occurrences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostStructure {
    /// Structure identifier (typically a PDB id)
    pub id: String,

    /// Residue graph over residues and cofactors
    pub graph: ResidueGraph,

    /// Residue metadata keyed by graph node name
    #[serde(default)]
    pub residues: BTreeMap<String, Residue>,
}

impl HostStructure {
    pub fn new(id: impl Into<String>, mut graph: ResidueGraph) -> Self {
        let id = id.into();
        graph.set_id(id.clone());
        Self {
            id,
            graph,
            residues: BTreeMap::new(),
        }
    }

    pub fn with_residue(mut self, name: impl Into<String>, residue: Residue) -> Self {
        self.residues.insert(name.into(), residue);
        self
    }

    pub fn insert_residue(&mut self, name: impl Into<String>, residue: Residue) {
        self.residues.insert(name.into(), residue);
    }

    /// Residue metadata for a graph node.
    pub fn residue(&self, name: &str) -> Result<&Residue> {
        self.residues
            .get(name)
            .ok_or_else(|| EmapError::missing_residue(self.id.clone(), name))
    }

    /// Checks that every graph node has residue metadata and the graph id
    /// matches the structure id.
    pub fn validate(&self) -> Result<()> {
        if self.graph.id() != self.id {
            return Err(EmapError::validation(format!(
                "graph id '{}' does not match structure id '{}'",
                self.graph.id(),
                self.id
            )));
        }
        for node in self.graph.nodes() {
            self.residue(&node.name)?;
        }
        Ok(())
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut structure: HostStructure = serde_json::from_str(content)?;
        if structure.graph.id().is_empty() {
            structure.graph.set_id(structure.id.clone());
        }
        Ok(structure)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
