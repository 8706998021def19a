// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::errors::ScheduleError;
use crate::graph::{Graph, NodeId, NodeSource, OpId};
use crate::observability::messages::engine::{ScheduleBuilt, TopologicalSortFailed};
use crate::observability::messages::StructuredLog;
use crate::operators::{Attributes, OperatorDefinition};
use crate::schema::Schema;

/// One operator instance to run, detached from the graph that produced it.
#[derive(Debug, Clone)]
pub struct Step {
    pub op: OpId,
    pub definition: Arc<OperatorDefinition>,
    pub inputs: Vec<NodeId>,
    pub outputs: Vec<NodeId>,
    pub output_schemas: Vec<Schema>,
    pub attributes: Arc<Attributes>,
}

impl Step {
    pub fn key(&self) -> &'static str {
        self.definition.key
    }

    /// Inputs without repetition, in slot order.
    pub fn distinct_inputs(&self) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        self.inputs.iter().copied().filter(|n| seen.insert(*n)).collect()
    }
}

/// A leaf the schedule reads, with the schema its data must have.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledLeaf {
    pub node: NodeId,
    pub name: String,
    pub schema: Schema,
}

/// Ordered list of operator instances needed to compute the requested nodes.
///
/// Only instances reachable backwards from a requested node are included.
/// Ties between independent instances are broken by construction order, so
/// the same graph and request always produce the same schedule.
#[derive(Debug, Clone)]
pub struct Schedule {
    steps: Vec<Step>,
    levels: Vec<Vec<usize>>,
    requested: Vec<NodeId>,
    leaves: Vec<ScheduledLeaf>,
    consumer_counts: HashMap<NodeId, usize>,
}

impl Schedule {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Requested nodes, in request order.
    pub fn requested(&self) -> &[NodeId] {
        &self.requested
    }

    /// Leaves that must be bound, ordered by node.
    pub fn leaves(&self) -> &[ScheduledLeaf] {
        &self.leaves
    }

    /// Step positions grouped by dependency depth. Steps of one level only
    /// read leaves or outputs of earlier levels.
    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    /// Number of scheduled steps reading each node.
    pub fn consumer_counts(&self) -> &HashMap<NodeId, usize> {
        &self.consumer_counts
    }
}

/// Builds the schedule computing `requested` from `graph`.
pub fn build_schedule(graph: &Graph, requested: &[NodeId]) -> Result<Schedule, ScheduleError> {
    if let Some(node) = requested.iter().find(|n| !graph.contains(**n)) {
        return Err(ScheduleError::ForeignNode { node: *node });
    }

    // Backward reachability.
    let mut needed: BTreeSet<OpId> = BTreeSet::new();
    let mut leaves: BTreeSet<NodeId> = BTreeSet::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<NodeId> = requested.to_vec();
    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        match graph.node(node).map(|n| &n.source) {
            Ok(NodeSource::Leaf { .. }) => {
                leaves.insert(node);
            }
            Ok(NodeSource::Operator { op, .. }) => {
                if needed.insert(*op) {
                    if let Some(instance) = graph.instance(*op) {
                        stack.extend(instance.inputs.iter().copied());
                    }
                }
            }
            Err(_) => return Err(ScheduleError::ForeignNode { node }),
        }
    }

    // Kahn's algorithm over the needed instances.
    let mut in_degree: HashMap<OpId, usize> = HashMap::new();
    let mut dependents: HashMap<OpId, Vec<OpId>> = HashMap::new();
    for op in &needed {
        let producers = producers(graph, *op);
        in_degree.insert(*op, producers.len());
        for producer in producers {
            dependents.entry(producer).or_default().push(*op);
        }
    }

    let mut ready: BTreeSet<OpId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(op, _)| *op)
        .collect();
    let mut order: Vec<OpId> = Vec::with_capacity(needed.len());
    let mut depth: HashMap<OpId, usize> = HashMap::new();

    while let Some(op) = ready.pop_first() {
        let level = producers(graph, op)
            .iter()
            .filter_map(|p| depth.get(p))
            .map(|d| d + 1)
            .max()
            .unwrap_or(0);
        depth.insert(op, level);
        order.push(op);

        for dependent in dependents.get(&op).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if order.len() != needed.len() {
        let scheduled: HashSet<OpId> = order.iter().copied().collect();
        let unscheduled: Vec<usize> = needed
            .iter()
            .filter(|op| !scheduled.contains(op))
            .map(|op| op.index())
            .collect();
        TopologicalSortFailed {
            unscheduled_count: unscheduled.len(),
        }
        .log();
        return Err(ScheduleError::CyclicGraph { unscheduled });
    }

    let mut steps = Vec::with_capacity(order.len());
    for op in &order {
        let instance = graph.instance(*op).ok_or_else(|| ScheduleError::CyclicGraph {
            unscheduled: vec![op.index()],
        })?;
        let output_schemas = instance
            .outputs
            .iter()
            .map(|n| {
                graph
                    .schema(*n)
                    .cloned()
                    .map_err(|_| ScheduleError::ForeignNode { node: *n })
            })
            .collect::<Result<Vec<_>, _>>()?;
        steps.push(Step {
            op: *op,
            definition: instance.definition.clone(),
            inputs: instance.inputs.clone(),
            outputs: instance.outputs.clone(),
            output_schemas,
            attributes: instance.attributes.clone(),
        });
    }

    let level_count = depth.values().max().map(|d| d + 1).unwrap_or(0);
    let mut levels = vec![Vec::new(); level_count];
    for (position, op) in order.iter().enumerate() {
        levels[depth[op]].push(position);
    }

    let mut consumer_counts: HashMap<NodeId, usize> = HashMap::new();
    for step in &steps {
        for input in step.distinct_inputs() {
            *consumer_counts.entry(input).or_default() += 1;
        }
    }

    let leaves = leaves
        .into_iter()
        .filter_map(|node| {
            let schema = graph.schema(node).ok()?.clone();
            let name = graph.node(node).ok()?.leaf_name()?.to_string();
            Some(ScheduledLeaf { node, name, schema })
        })
        .collect();

    ScheduleBuilt {
        requested_count: requested.len(),
        step_count: steps.len(),
        graph_instance_count: graph.instances().len(),
    }
    .log();

    Ok(Schedule {
        steps,
        levels,
        requested: requested.to_vec(),
        leaves,
        consumer_counts,
    })
}

/// Distinct instances producing the inputs of `op`.
fn producers(graph: &Graph, op: OpId) -> Vec<OpId> {
    let mut producers: Vec<OpId> = graph
        .instance(op)
        .map(|instance| {
            instance
                .inputs
                .iter()
                .filter_map(|input| graph.producer(*input).map(|p| p.id))
                .collect()
        })
        .unwrap_or_default();
    producers.sort();
    producers.dedup();
    producers
}
