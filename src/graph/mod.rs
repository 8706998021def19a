// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lazy computation graph.
//!
//! A [`Graph`] owns its nodes and operator instances in flat vectors and hands
//! out index handles. Instances can only reference nodes that already exist,
//! so every graph is acyclic by construction.

pub mod arena;
pub mod node;

pub use arena::Graph;
pub use node::{Node, NodeId, NodeSource, OpId, OperatorInstance};
