// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::operators::{Attributes, OperatorDefinition};
use crate::schema::Schema;

/// Handle to a node of one particular [`crate::graph::Graph`].
///
/// Handles carry the id of the graph that issued them, so a handle from
/// another graph is rejected instead of silently aliasing a local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) graph: usize,
    pub(crate) index: usize,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} (graph {})", self.index, self.graph)
    }
}

/// Handle to an operator instance. Instances are numbered in construction
/// order, which the scheduler uses as its tie-breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId {
    pub(crate) graph: usize,
    pub(crate) index: usize,
}

impl OpId {
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.index)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeSource {
    /// Placeholder bound to caller-supplied data at evaluation time.
    Leaf { name: String },
    /// Output `slot` of an operator instance.
    Operator { op: OpId, slot: usize },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub schema: Schema,
    pub source: NodeSource,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self.source, NodeSource::Leaf { .. })
    }

    pub fn leaf_name(&self) -> Option<&str> {
        match &self.source {
            NodeSource::Leaf { name } => Some(name),
            NodeSource::Operator { .. } => None,
        }
    }
}

/// An operator applied to concrete input nodes with validated attributes.
///
/// Two instances built from identical arguments are still distinct: the
/// graph never deduplicates.
#[derive(Debug, Clone)]
pub struct OperatorInstance {
    pub id: OpId,
    pub definition: Arc<OperatorDefinition>,
    pub inputs: Vec<NodeId>,
    pub outputs: Vec<NodeId>,
    pub attributes: Arc<Attributes>,
}

impl OperatorInstance {
    pub fn key(&self) -> &'static str {
        self.definition.key
    }
}
