// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::GraphError;
use crate::graph::{Node, NodeId, NodeSource, OpId, OperatorInstance};
use crate::observability::messages::graph::{OperatorInstantiated, OperatorRejected};
use crate::observability::messages::StructuredLog;
use crate::operators::{Attributes, OperatorContext, OperatorRegistry};
use crate::schema::Schema;

static GRAPH_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Arena holding the nodes and operator instances of one computation graph.
///
/// Every mutation validates eagerly: an operator is only added when its
/// inputs satisfy the declared contract and its attributes match the
/// declared schema, so a `Graph` is always well-formed.
///
/// # Examples
///
/// ```rust
/// use the_tempograph::graph::Graph;
/// use the_tempograph::operators::{arithmetic, OperatorRegistry};
/// use the_tempograph::schema::{FeatureSchema, FeatureType, Schema};
///
/// let registry = OperatorRegistry::with_builtins().unwrap().freeze();
/// let mut graph = Graph::new(registry);
///
/// let schema = Schema::new(vec![FeatureSchema::new("x", FeatureType::Float64)], vec![]);
/// let a = graph.leaf("a", schema.clone());
/// let b = graph.leaf("b", schema);
/// let ratio = arithmetic::divide(&mut graph, a, b).unwrap();
///
/// assert_eq!(graph.schema(ratio).unwrap().feature_names(), vec!["div_x_x"]);
/// ```
#[derive(Debug)]
pub struct Graph {
    id: usize,
    registry: Arc<OperatorRegistry>,
    nodes: Vec<Node>,
    instances: Vec<OperatorInstance>,
}

impl Graph {
    pub fn new(registry: Arc<OperatorRegistry>) -> Self {
        Self {
            id: GRAPH_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            registry,
            nodes: Vec::new(),
            instances: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Arc<OperatorRegistry> {
        &self.registry
    }

    /// Adds a placeholder for data supplied at evaluation time.
    pub fn leaf(&mut self, name: impl Into<String>, schema: Schema) -> NodeId {
        self.push_node(Node {
            schema,
            source: NodeSource::Leaf { name: name.into() },
        })
    }

    /// Instantiates operator `key` over `inputs` and returns its output
    /// nodes in declared slot order.
    pub fn apply(
        &mut self,
        key: &str,
        inputs: &[NodeId],
        attributes: Attributes,
    ) -> Result<Vec<NodeId>, GraphError> {
        match self.try_apply(key, inputs, attributes) {
            Ok(outputs) => Ok(outputs),
            Err(error) => {
                OperatorRejected { key, error: &error }.log();
                Err(error)
            }
        }
    }

    /// Same as [`Graph::apply`] for operators with exactly one output.
    pub fn apply_single(
        &mut self,
        key: &str,
        inputs: &[NodeId],
        attributes: Attributes,
    ) -> Result<NodeId, GraphError> {
        let definition = self.registry.lookup(key)?;
        if definition.outputs.len() != 1 {
            return Err(GraphError::type_contract(
                key,
                format!("operator has {} outputs, expected one", definition.outputs.len()),
            ));
        }
        let outputs = self.apply(key, inputs, attributes)?;
        Ok(outputs[0])
    }

    fn try_apply(
        &mut self,
        key: &str,
        inputs: &[NodeId],
        attributes: Attributes,
    ) -> Result<Vec<NodeId>, GraphError> {
        let definition = self.registry.lookup(key)?;

        let input_schemas = inputs
            .iter()
            .map(|id| self.schema(*id))
            .collect::<Result<Vec<&Schema>, GraphError>>()?;
        definition.check_inputs(&input_schemas)?;
        let attributes = definition.validate_attributes(attributes)?;

        let output_schemas = (definition.infer)(&OperatorContext {
            key: definition.key,
            inputs: &input_schemas,
            attributes: &attributes,
        })?;
        if output_schemas.len() != definition.outputs.len() {
            return Err(GraphError::type_contract(
                definition.key,
                format!(
                    "contract produced {} output schemas for {} declared outputs",
                    output_schemas.len(),
                    definition.outputs.len()
                ),
            ));
        }

        let op = OpId {
            graph: self.id,
            index: self.instances.len(),
        };
        let outputs: Vec<NodeId> = output_schemas
            .into_iter()
            .enumerate()
            .map(|(slot, schema)| {
                self.push_node(Node {
                    schema,
                    source: NodeSource::Operator { op, slot },
                })
            })
            .collect();

        OperatorInstantiated {
            key: definition.key,
            instance: op.index,
            input_count: inputs.len(),
            output_count: outputs.len(),
        }
        .log();

        self.instances.push(OperatorInstance {
            id: op,
            definition,
            inputs: inputs.to_vec(),
            outputs: outputs.clone(),
            attributes: Arc::new(attributes),
        });
        Ok(outputs)
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId {
            graph: self.id,
            index: self.nodes.len(),
        };
        self.nodes.push(node);
        id
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.graph == self.id && node.index < self.nodes.len()
    }

    pub fn node(&self, node: NodeId) -> Result<&Node, GraphError> {
        if !self.contains(node) {
            return Err(GraphError::ForeignNode { node });
        }
        Ok(&self.nodes[node.index])
    }

    pub fn schema(&self, node: NodeId) -> Result<&Schema, GraphError> {
        self.node(node).map(|n| &n.schema)
    }

    /// Instance producing `node`, or `None` for leaves and foreign handles.
    pub fn producer(&self, node: NodeId) -> Option<&OperatorInstance> {
        match self.node(node).ok()?.source {
            NodeSource::Operator { op, .. } => self.instance(op),
            NodeSource::Leaf { .. } => None,
        }
    }

    pub fn instance(&self, op: OpId) -> Option<&OperatorInstance> {
        if op.graph != self.id {
            return None;
        }
        self.instances.get(op.index)
    }

    /// Instances in construction order.
    pub fn instances(&self) -> &[OperatorInstance] {
        &self.instances
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Leaf handles with their names, in construction order.
    pub fn leaves(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.nodes.iter().enumerate().filter_map(move |(index, node)| {
            node.leaf_name().map(|name| {
                (
                    NodeId {
                        graph: self.id,
                        index,
                    },
                    name,
                )
            })
        })
    }
}
