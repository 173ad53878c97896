//! Error types for eMap subgraph mining.

use thiserror::Error;

/// Unified error type for all eMap mining operations.
///
/// Alignment and isomorphism fallbacks (infinite RMSD, no mapping between two
/// occurrences) are not errors; they are encoded in the similarity results.
#[derive(Error, Debug)]
pub enum EmapError {
    /// Clustering option outside {structural, sequence}
    #[error("Invalid clustering option '{0}': expected 'structural' or 'sequence'")]
    InvalidOption(String),

    /// A graph node has no residue record in its host structure
    #[error("Residue '{residue}' not found in structure '{structure}'")]
    MissingResidue { structure: String, residue: String },

    /// A residue record carries no atoms at all
    #[error("Residue '{residue}' in structure '{structure}' has no atoms")]
    MissingAtoms { structure: String, residue: String },

    /// A node name could not be resolved inside a graph
    #[error("Node '{node}' not found in graph '{graph}'")]
    MissingNode { graph: String, node: String },

    /// An expected edge is absent from a graph
    #[error("Edge {node_a}-{node_b} not found in graph '{graph}'")]
    MissingEdge {
        graph: String,
        node_a: String,
        node_b: String,
    },

    /// Structure id not part of a pattern's support
    #[error("Unknown structure '{0}'")]
    UnknownStructure(String),

    /// Occurrence id not known to the pattern
    #[error("Unknown occurrence '{0}'")]
    UnknownOccurrence(String),

    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// I/O errors (dataset reading, DOT writing)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// TOML configuration parse errors
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl EmapError {
    /// Creates an invalid clustering option error.
    pub fn invalid_option(option: impl Into<String>) -> Self {
        EmapError::InvalidOption(option.into())
    }

    /// Creates a missing residue error.
    pub fn missing_residue(structure: impl Into<String>, residue: impl Into<String>) -> Self {
        EmapError::MissingResidue {
            structure: structure.into(),
            residue: residue.into(),
        }
    }

    /// Creates a missing atoms error.
    pub fn missing_atoms(structure: impl Into<String>, residue: impl Into<String>) -> Self {
        EmapError::MissingAtoms {
            structure: structure.into(),
            residue: residue.into(),
        }
    }

    /// Creates a missing node error.
    pub fn missing_node(graph: impl Into<String>, node: impl Into<String>) -> Self {
        EmapError::MissingNode {
            graph: graph.into(),
            node: node.into(),
        }
    }

    /// Creates a missing edge error.
    pub fn missing_edge(
        graph: impl Into<String>,
        node_a: impl Into<String>,
        node_b: impl Into<String>,
    ) -> Self {
        EmapError::MissingEdge {
            graph: graph.into(),
            node_a: node_a.into(),
            node_b: node_b.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        EmapError::ConfigError(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        EmapError::ValidationError(message.into())
    }

    /// True when the error comes from collaborator data (structure graphs,
    /// residue tables) rather than from the caller's arguments.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            EmapError::MissingResidue { .. }
                | EmapError::MissingAtoms { .. }
                | EmapError::MissingNode { .. }
                | EmapError::MissingEdge { .. }
                | EmapError::UnknownStructure(_)
        )
    }

    /// Returns a user-friendly error message with actionable guidance.
    pub fn user_message(&self) -> String {
        match self {
            EmapError::InvalidOption(option) => {
                format!(
                    "Invalid clustering option '{}'\n\
                     → Use either 'structural' or 'sequence'.",
                    option
                )
            }
            EmapError::MissingResidue { structure, residue } => {
                format!(
                    "Residue '{}' not found in structure '{}'\n\
                     → Every graph node must have a matching entry in the residue table.",
                    residue, structure
                )
            }
            EmapError::ConfigError(msg) => {
                format!(
                    "Configuration error: {}\n\
                     → Review your configuration file; thresholds must be finite and non-negative.",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for eMap operations.
pub type Result<T> = std::result::Result<T, EmapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = EmapError::missing_residue("1u3d", "W382(A)");
        assert!(matches!(err, EmapError::MissingResidue { .. }));
        assert!(err.to_string().contains("W382(A)"));

        let err = EmapError::missing_edge("1u3d", "W382(A)", "W359(A)");
        assert!(matches!(err, EmapError::MissingEdge { .. }));

        let err = EmapError::invalid_option("spectral");
        assert!(matches!(err, EmapError::InvalidOption(_)));
    }

    #[test]
    fn test_data_errors() {
        assert!(EmapError::missing_node("pattern", "3").is_data_error());
        assert!(EmapError::missing_atoms("1u3d", "FAD510(A)").is_data_error());
        assert!(!EmapError::invalid_option("x").is_data_error());
        assert!(!EmapError::config("bad").is_data_error());
    }

    #[test]
    fn test_user_message_guidance() {
        let msg = EmapError::invalid_option("spectral").user_message();
        assert!(msg.contains("'structural' or 'sequence'"));
    }
}
