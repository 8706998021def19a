// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::errors::{GraphError, RegistryError};

/// Errors found while validating the node references of a pipeline file
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Operators reference each other in a loop
    CyclicDependency {
        /// The cycle path, first id repeated at the end
        cycle: Vec<String>,
    },
    /// A reference points at an id that no leaf or operator declares
    UnresolvedReference {
        /// The operator (or `outputs`) holding the reference
        node_id: String,
        /// The reference as written in the file
        reference: String,
    },
    /// Two leaves or operators share an id
    DuplicateId {
        /// The duplicate id
        id: String,
    },
    /// An id that references could never name: empty, or containing the
    /// `.` slot separator
    InvalidId {
        /// The id as written in the file
        id: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::CyclicDependency { cycle } => {
                write!(f, "Cyclic dependency detected: {}", cycle.join(" -> "))
            }
            ValidationError::UnresolvedReference { node_id, reference } => {
                write!(
                    f,
                    "'{}' references '{}' which does not exist",
                    node_id, reference
                )
            }
            ValidationError::DuplicateId { id } => {
                write!(f, "Duplicate id: '{}'", id)
            }
            ValidationError::InvalidId { id } => {
                write!(f, "Invalid id: '{}' (ids must be non-empty and must not contain '.')", id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a pipeline file and turning it into a runtime and graph.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pipeline YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid leaf data JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pipeline validation failed:\n{}", join_lines(.0))]
    Validation(Vec<ValidationError>),

    #[error("leaf '{leaf}': {reason}")]
    InvalidLeaf { leaf: String, reason: String },

    #[error("operator '{node_id}': {reason}")]
    InvalidOperator { node_id: String, reason: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
