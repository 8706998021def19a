// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised by the schedule builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Internal consistency failure: graphs are built append-only, so a cycle
    /// means the arena was corrupted.
    #[error("internal consistency error: operator graph contains a cycle through instances {unscheduled:?}")]
    CyclicGraph { unscheduled: Vec<usize> },

    #[error("requested node {node} does not belong to this graph")]
    ForeignNode { node: NodeId },
}
