// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::backends::ImplementationRegistry;
use crate::data::EventSet;
use crate::engine::schedule::{Schedule, Step};
use crate::errors::ExecutionError;
use crate::graph::NodeId;
use crate::observability::messages::engine::{IntermediateReleased, StepCompleted};
use crate::observability::messages::StructuredLog;
use crate::traits::OperatorExecutor;

/// Concrete data bound to leaf nodes for one evaluation. Bound data is
/// shared, so the same bindings can be planned against several backends.
#[derive(Debug, Clone, Default)]
pub struct LeafBindings(HashMap<NodeId, Arc<EventSet>>);

impl LeafBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, leaf: NodeId, data: EventSet) -> Self {
        self.bind(leaf, data);
        self
    }

    /// Binds `data` to `leaf`, returning any data previously bound.
    pub fn bind(&mut self, leaf: NodeId, data: EventSet) -> Option<Arc<EventSet>> {
        self.0.insert(leaf, Arc::new(data))
    }

    pub fn get(&self, leaf: NodeId) -> Option<&EventSet> {
        self.0.get(&leaf).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(NodeId, EventSet)> for LeafBindings {
    fn from_iter<I: IntoIterator<Item = (NodeId, EventSet)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(leaf, data)| (leaf, Arc::new(data))).collect())
    }
}

/// A step together with the backend executor that will run it.
pub struct PlannedStep {
    pub step: Step,
    pub executor: Arc<dyn OperatorExecutor>,
}

impl std::fmt::Debug for PlannedStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannedStep")
            .field("key", &self.step.key())
            .field("op", &self.step.op)
            .field("executor", &self.executor.name())
            .finish()
    }
}

/// A schedule ready to run: every executor is resolved and every leaf is
/// bound to validated data.
///
/// Resolution happens before any step runs, so an operator missing on the
/// chosen backend fails the evaluation without executing anything.
#[derive(Debug)]
pub struct ExecutionPlan {
    backend: String,
    steps: Vec<Arc<PlannedStep>>,
    levels: Vec<Vec<usize>>,
    requested: Vec<NodeId>,
    consumer_counts: HashMap<NodeId, usize>,
    leaves: HashMap<NodeId, Arc<EventSet>>,
}

impl ExecutionPlan {
    pub fn resolve(
        schedule: &Schedule,
        registry: &ImplementationRegistry,
        backend: &str,
        bindings: &LeafBindings,
    ) -> Result<Self, ExecutionError> {
        let steps = schedule
            .steps()
            .iter()
            .map(|step| -> Result<Arc<PlannedStep>, ExecutionError> {
                let executor = registry.resolve(step.key(), backend)?;
                Ok(Arc::new(PlannedStep {
                    step: step.clone(),
                    executor,
                }))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut leaves = HashMap::new();
        for leaf in schedule.leaves() {
            let data = bindings
                .0
                .get(&leaf.node)
                .cloned()
                .ok_or_else(|| ExecutionError::MissingLeafBinding {
                    leaf: leaf.name.clone(),
                })?;
            if data.schema() != &leaf.schema {
                return Err(ExecutionError::InvalidLeafData {
                    leaf: leaf.name.clone(),
                    reason: format!(
                        "schema {:?} does not match the declared {:?}",
                        data.schema(),
                        leaf.schema
                    ),
                });
            }
            data.validate()
                .map_err(|e| ExecutionError::InvalidLeafData {
                    leaf: leaf.name.clone(),
                    reason: e.to_string(),
                })?;
            leaves.insert(leaf.node, data);
        }

        Ok(Self {
            backend: backend.to_string(),
            steps,
            levels: schedule.levels().to_vec(),
            requested: schedule.requested().to_vec(),
            consumer_counts: schedule.consumer_counts().clone(),
            leaves,
        })
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn steps(&self) -> &[Arc<PlannedStep>] {
        &self.steps
    }

    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    pub fn requested(&self) -> &[NodeId] {
        &self.requested
    }
}

/// Runs one step and checks the executor honoured the declared outputs.
pub fn run_step(
    planned: &PlannedStep,
    backend: &str,
    inputs: &[Arc<EventSet>],
) -> Result<Vec<EventSet>, ExecutionError> {
    let step = &planned.step;
    let start = Instant::now();
    let refs: Vec<&EventSet> = inputs.iter().map(Arc::as_ref).collect();

    let outputs = planned
        .executor
        .execute(&refs, &step.attributes, &step.output_schemas)
        .map_err(|source| ExecutionError::ExecutorFailed {
            operator: step.key().to_string(),
            backend: backend.to_string(),
            source,
        })?;

    if outputs.len() != step.output_schemas.len() {
        return Err(ExecutionError::OutputContract {
            operator: step.key().to_string(),
            message: format!(
                "returned {} outputs, {} declared",
                outputs.len(),
                step.output_schemas.len()
            ),
        });
    }
    for (output, schema) in outputs.iter().zip(&step.output_schemas) {
        if output.schema() != schema {
            return Err(ExecutionError::OutputContract {
                operator: step.key().to_string(),
                message: "returned a collection with a different schema than declared".to_string(),
            });
        }
        output.validate().map_err(|e| ExecutionError::OutputContract {
            operator: step.key().to_string(),
            message: e.to_string(),
        })?;
    }

    StepCompleted {
        key: step.key(),
        instance: step.op.index(),
        backend,
        executor: planned.executor.name(),
        output_events: outputs.iter().map(EventSet::num_events).sum(),
        duration: start.elapsed(),
    }
    .log();
    Ok(outputs)
}

/// Execution-local results keyed by node.
///
/// A result is dropped as soon as every scheduled consumer has run, unless
/// it was requested, so peak memory follows the live set of the schedule.
#[derive(Debug)]
pub struct ResultStore {
    values: HashMap<NodeId, Arc<EventSet>>,
    remaining: HashMap<NodeId, usize>,
    requested: HashSet<NodeId>,
}

impl ResultStore {
    pub fn new(plan: &ExecutionPlan) -> Self {
        Self {
            values: plan.leaves.clone(),
            remaining: plan.consumer_counts.clone(),
            requested: plan.requested.iter().copied().collect(),
        }
    }

    /// Inputs of `step` in slot order.
    pub fn inputs(&self, step: &Step) -> Result<Vec<Arc<EventSet>>, ExecutionError> {
        step.inputs
            .iter()
            .map(|node| {
                self.values
                    .get(node)
                    .cloned()
                    .ok_or_else(|| ExecutionError::InternalError {
                        message: format!(
                            "input {} of '{}' was not computed before use",
                            node,
                            step.key()
                        ),
                    })
            })
            .collect()
    }

    pub fn store(&mut self, step: &Step, outputs: Vec<EventSet>) {
        for (node, output) in step.outputs.iter().zip(outputs) {
            self.values.insert(*node, Arc::new(output));
        }
    }

    /// Marks `step` as having consumed its inputs.
    pub fn release_inputs(&mut self, step: &Step) {
        for node in step.distinct_inputs() {
            let Some(remaining) = self.remaining.get_mut(&node) else {
                continue;
            };
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 && !self.requested.contains(&node) {
                self.values.remove(&node);
                IntermediateReleased {
                    node: node.index(),
                    live_count: self.values.len(),
                }
                .log();
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.values.len()
    }

    /// Requested results, in request order.
    pub fn into_outputs(mut self, requested: &[NodeId]) -> Result<Vec<EventSet>, ExecutionError> {
        let mut outputs = Vec::with_capacity(requested.len());
        for (position, node) in requested.iter().enumerate() {
            let shared = if requested[position + 1..].contains(node) {
                self.values.get(node).cloned()
            } else {
                self.values.remove(node)
            };
            let value = shared.ok_or_else(|| ExecutionError::InternalError {
                message: format!("requested node {} was never computed", node),
            })?;
            outputs.push(Arc::try_unwrap(value).unwrap_or_else(|shared| (*shared).clone()));
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, IndexValue};
    use crate::engine::schedule::build_schedule;
    use crate::errors::RegistryError;
    use crate::graph::Graph;
    use crate::operators::{arithmetic_scalar, OperatorRegistry};
    use crate::schema::{FeatureSchema, FeatureType, IndexSchema, Schema};

    fn schema() -> Schema {
        Schema::new(
            vec![FeatureSchema::new("x", FeatureType::Float64)],
            vec![IndexSchema::new("id", FeatureType::String).unwrap()],
        )
    }

    fn setup() -> (Graph, ImplementationRegistry, NodeId, NodeId) {
        let operators = OperatorRegistry::with_builtins().unwrap().freeze();
        let registry = ImplementationRegistry::with_builtins(operators.clone()).unwrap();
        let mut graph = Graph::new(operators);
        let leaf = graph.leaf("input", schema());
        let out = arithmetic_scalar::add_scalar(&mut graph, leaf, 1.0).unwrap();
        (graph, registry, leaf, out)
    }

    fn data() -> EventSet {
        EventSet::new(schema()).with_group(
            vec![IndexValue::from("A")],
            vec![1.0, 2.0],
            vec![Column::from(vec![1.0, 2.0])],
        )
    }

    #[test]
    fn test_resolve_binds_leaves() {
        let (graph, registry, leaf, out) = setup();
        let schedule = build_schedule(&graph, &[out]).unwrap();
        let plan =
            ExecutionPlan::resolve(&schedule, &registry, "array", &LeafBindings::new().with(leaf, data()))
                .unwrap();
        assert_eq!(plan.steps().len(), 1);
        assert_eq!(plan.backend(), "array");
        assert_eq!(ResultStore::new(&plan).live_count(), 1);
    }

    #[test]
    fn test_resolve_failures() {
        let (graph, registry, leaf, out) = setup();
        let schedule = build_schedule(&graph, &[out]).unwrap();

        let missing = ExecutionPlan::resolve(&schedule, &registry, "array", &LeafBindings::new());
        assert_eq!(
            missing.unwrap_err(),
            ExecutionError::MissingLeafBinding {
                leaf: "input".to_string()
            }
        );

        let unsorted = EventSet::new(schema()).with_group(
            vec![IndexValue::from("A")],
            vec![2.0, 1.0],
            vec![Column::from(vec![1.0, 2.0])],
        );
        let invalid =
            ExecutionPlan::resolve(&schedule, &registry, "array", &LeafBindings::new().with(leaf, unsorted));
        assert!(matches!(invalid, Err(ExecutionError::InvalidLeafData { .. })));

        let wrong_schema = EventSet::new(Schema::default());
        let mismatch = ExecutionPlan::resolve(
            &schedule,
            &registry,
            "array",
            &LeafBindings::new().with(leaf, wrong_schema),
        );
        assert!(matches!(mismatch, Err(ExecutionError::InvalidLeafData { .. })));

        let unimplemented =
            ExecutionPlan::resolve(&schedule, &registry, "accelerated", &LeafBindings::new());
        assert!(matches!(
            unimplemented,
            Err(ExecutionError::Registry(RegistryError::BackendNotImplemented { .. }))
        ));
    }

    #[test]
    fn test_store_releases_consumed_intermediates() {
        let (graph, registry, leaf, out) = setup();
        let schedule = build_schedule(&graph, &[out]).unwrap();
        let plan =
            ExecutionPlan::resolve(&schedule, &registry, "array", &LeafBindings::new().with(leaf, data()))
                .unwrap();

        let mut store = ResultStore::new(&plan);
        let planned = &plan.steps()[0];
        let inputs = store.inputs(&planned.step).unwrap();
        let outputs = run_step(planned, plan.backend(), &inputs).unwrap();
        drop(inputs);
        store.store(&planned.step, outputs);
        store.release_inputs(&planned.step);

        assert_eq!(store.live_count(), 1);
        let outputs = store.into_outputs(&[out, out]).unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0], outputs[1]);
    }
}
