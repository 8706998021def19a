// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::config::loader::parse_reference;
use crate::config::{validate_pipeline, Config, OperatorConfig};
use crate::errors::ConfigError;
use crate::graph::{Graph, NodeId};
use crate::operators::{AttributeValue, Attributes, OperatorDefinition, OperatorRegistry};

/// What an id in a pipeline file stands for once it is in the graph.
#[derive(Debug, Clone)]
enum Declared {
    Leaf(NodeId),
    Operator {
        definition: Arc<OperatorDefinition>,
        outputs: Vec<NodeId>,
    },
}

/// A pipeline file turned into a graph, with its ids mapped to nodes.
#[derive(Debug)]
pub struct Pipeline {
    graph: Graph,
    declared: HashMap<String, Declared>,
    leaves: Vec<(String, NodeId)>,
    outputs: Vec<NodeId>,
    output_names: Vec<String>,
}

impl Pipeline {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Leaf ids with their nodes, in file order.
    pub fn leaves(&self) -> &[(String, NodeId)] {
        &self.leaves
    }

    pub fn leaf(&self, id: &str) -> Option<NodeId> {
        match self.declared.get(id) {
            Some(Declared::Leaf(node)) => Some(*node),
            _ => None,
        }
    }

    /// Requested output nodes, in the order of the file's `outputs` list.
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// The `outputs` references as written, parallel to [`Pipeline::outputs`].
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Resolves a node reference (`id` or `id.slot`).
    pub fn node(&self, reference: &str) -> Option<NodeId> {
        resolve(&self.declared, "", reference).ok()
    }
}

/// Builds a [`Graph`] from a validated pipeline file.
///
/// Operators are applied in dependency order regardless of the order they
/// appear in the file. Schema and attribute checks happen inside
/// [`Graph::apply`], so a pipeline that builds is fully type-checked.
pub struct PipelineBuilder {
    registry: Arc<OperatorRegistry>,
}

impl PipelineBuilder {
    pub fn new(registry: Arc<OperatorRegistry>) -> Self {
        Self { registry }
    }

    pub fn build(&self, config: &Config) -> Result<Pipeline, ConfigError> {
        validate_pipeline(config).map_err(ConfigError::Validation)?;

        let mut graph = Graph::new(Arc::clone(&self.registry));
        let mut declared = HashMap::new();
        let mut leaves = Vec::with_capacity(config.leaves.len());

        for leaf in &config.leaves {
            let node = graph.leaf(leaf.id.clone(), leaf.schema()?);
            declared.insert(leaf.id.clone(), Declared::Leaf(node));
            leaves.push((leaf.id.clone(), node));
        }

        let mut pending: Vec<&OperatorConfig> = config.operators.iter().collect();
        while !pending.is_empty() {
            let (ready, waiting): (Vec<_>, Vec<_>) = pending.into_iter().partition(|op| {
                op.inputs
                    .values()
                    .all(|r| declared.contains_key(parse_reference(r).0))
            });

            if ready.is_empty() {
                let stuck = waiting.first().map(|op| op.id.clone()).unwrap_or_default();
                return Err(ConfigError::InvalidOperator {
                    node_id: stuck,
                    reason: "inputs can never be resolved".to_string(),
                });
            }

            for op in ready {
                let entry = self.apply(&mut graph, &declared, op)?;
                declared.insert(op.id.clone(), entry);
            }
            pending = waiting;
        }

        let outputs = config
            .outputs
            .iter()
            .map(|reference| resolve(&declared, crate::config::validation::OUTPUTS, reference))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Pipeline {
            graph,
            declared,
            leaves,
            outputs,
            output_names: config.outputs.clone(),
        })
    }

    fn apply(
        &self,
        graph: &mut Graph,
        declared: &HashMap<String, Declared>,
        op: &OperatorConfig,
    ) -> Result<Declared, ConfigError> {
        let definition = self.registry.lookup(&op.operator)?;

        if let Some(unknown) = op
            .inputs
            .keys()
            .find(|slot| !definition.inputs.iter().any(|input| input.name == slot.as_str()))
        {
            return Err(ConfigError::InvalidOperator {
                node_id: op.id.clone(),
                reason: format!("{} has no input slot '{}'", definition.key, unknown),
            });
        }

        // Slots bind positionally, so an optional slot may only be left
        // unbound when every slot after it is unbound too.
        let mut inputs = Vec::with_capacity(definition.inputs.len());
        let mut unbound: Option<&str> = None;
        for input in &definition.inputs {
            match (op.inputs.get(input.name), unbound) {
                (Some(_), Some(skipped)) => {
                    return Err(ConfigError::InvalidOperator {
                        node_id: op.id.clone(),
                        reason: format!(
                            "input slot '{}' is bound but earlier slot '{}' is not",
                            input.name, skipped
                        ),
                    })
                }
                (Some(reference), None) => inputs.push(resolve(declared, &op.id, reference)?),
                (None, _) if input.optional => unbound = unbound.or(Some(input.name)),
                (None, _) => {
                    return Err(ConfigError::InvalidOperator {
                        node_id: op.id.clone(),
                        reason: format!("missing input slot '{}'", input.name),
                    })
                }
            }
        }

        let attributes = convert_attributes(&op.id, &op.attributes)?;
        let outputs = graph.apply(&op.operator, &inputs, attributes)?;

        Ok(Declared::Operator { definition, outputs })
    }
}

fn resolve(
    declared: &HashMap<String, Declared>,
    node_id: &str,
    reference: &str,
) -> Result<NodeId, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidOperator {
        node_id: node_id.to_string(),
        reason,
    };
    let (id, slot) = parse_reference(reference);

    match (declared.get(id), slot) {
        (None, _) => Err(invalid(format!("unknown node '{}'", reference))),
        (Some(Declared::Leaf(node)), None) => Ok(*node),
        (Some(Declared::Leaf(_)), Some(slot)) => Err(invalid(format!(
            "leaf '{}' has no output slot '{}'",
            id, slot
        ))),
        (Some(Declared::Operator { outputs, .. }), None) => outputs
            .first()
            .copied()
            .ok_or_else(|| invalid(format!("'{}' has no outputs", id))),
        (Some(Declared::Operator { definition, outputs }), Some(slot)) => definition
            .output_position(slot)
            .and_then(|position| outputs.get(position).copied())
            .ok_or_else(|| {
                invalid(format!("{} has no output slot '{}'", definition.key, slot))
            }),
    }
}

/// Converts YAML attribute values into typed attributes. Integers stay
/// integers here; the operator definition widens them to floats where needed.
pub fn convert_attributes(
    node_id: &str,
    attributes: &BTreeMap<String, serde_yaml::Value>,
) -> Result<Attributes, ConfigError> {
    let mut converted = Attributes::new();
    for (name, value) in attributes {
        let value = convert_value(value).ok_or_else(|| ConfigError::InvalidOperator {
            node_id: node_id.to_string(),
            reason: format!("attribute '{}' has an unsupported value", name),
        })?;
        converted.insert(name.clone(), value);
    }
    Ok(converted)
}

fn convert_value(value: &serde_yaml::Value) -> Option<AttributeValue> {
    use serde_yaml::Value;

    match value {
        Value::Bool(b) => Some(AttributeValue::Boolean(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(AttributeValue::Integer(i)),
            None => n.as_f64().map(AttributeValue::Float),
        },
        Value::String(s) => Some(AttributeValue::String(s.clone())),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(AttributeValue::StringList),
        Value::Mapping(entries) => entries
            .iter()
            .map(|(k, v)| Some((k.as_str()?.to_string(), v.as_str()?.to_string())))
            .collect::<Option<BTreeMap<_, _>>>()
            .map(AttributeValue::StringMap),
        Value::Null | Value::Tagged(_) => None,
    }
}
