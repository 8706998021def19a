// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::RegistryError;
use crate::graph::NodeId;

/// Errors raised while adding nodes to a graph.
///
/// These are always raised synchronously by the call that builds the node,
/// so a malformed graph never reaches the scheduler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("type contract violated by operator '{operator}': {message}")]
    TypeContract { operator: String, message: String },

    #[error("invalid attribute '{attribute}' for operator '{operator}': {message}")]
    InvalidAttribute {
        operator: String,
        attribute: String,
        message: String,
    },

    #[error("node {node} does not belong to this graph")]
    ForeignNode { node: NodeId },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl GraphError {
    pub fn type_contract(operator: &str, message: impl Into<String>) -> Self {
        GraphError::TypeContract {
            operator: operator.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_attribute(operator: &str, attribute: &str, message: impl Into<String>) -> Self {
        GraphError::InvalidAttribute {
            operator: operator.to_string(),
            attribute: attribute.to_string(),
            message: message.into(),
        }
    }
}
