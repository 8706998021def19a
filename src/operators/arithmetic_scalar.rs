// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Arithmetic between every feature of a collection and a constant.

use crate::errors::{GraphError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::operators::{
    AttributeDef, AttributeType, Attributes, FeatureConstraint, OperatorContext,
    OperatorDefinition, OperatorRegistry,
};
use crate::schema::Schema;

pub const ADDITION_SCALAR: &str = "ADDITION_SCALAR";
pub const SUBTRACTION_SCALAR: &str = "SUBTRACTION_SCALAR";
pub const MULTIPLICATION_SCALAR: &str = "MULTIPLICATION_SCALAR";
pub const DIVISION_SCALAR: &str = "DIVISION_SCALAR";

pub const VALUE: &str = "value";

pub fn register(registry: &mut OperatorRegistry) -> Result<(), RegistryError> {
    registry.register(definition(ADDITION_SCALAR, FeatureConstraint::Numeric))?;
    registry.register(definition(SUBTRACTION_SCALAR, FeatureConstraint::Numeric))?;
    registry.register(definition(MULTIPLICATION_SCALAR, FeatureConstraint::Numeric))?;
    // Integer division is not defined; cast to a float type first.
    registry.register(definition(DIVISION_SCALAR, FeatureConstraint::Float))?;
    Ok(())
}

fn definition(key: &'static str, constraint: FeatureConstraint) -> OperatorDefinition {
    OperatorDefinition::new(key, infer)
        .input("input", constraint)
        .output("output")
        .attribute(AttributeDef::required(VALUE, AttributeType::Float))
}

fn infer(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    let input = ctx.input(0);
    let value = ctx
        .attributes
        .float(VALUE)
        .ok_or_else(|| ctx.attribute_error(VALUE, "missing required attribute"))?;

    if let Some(feature) = input
        .features
        .iter()
        .find(|f| f.dtype.is_integer() && !f.dtype.holds_exactly(value))
    {
        return Err(ctx.attribute_error(
            VALUE,
            format!(
                "{} is not representable as {} for feature '{}'",
                value, feature.dtype, feature.name
            ),
        ));
    }

    Ok(vec![input.clone()])
}

fn apply(graph: &mut Graph, key: &str, input: NodeId, value: f64) -> Result<NodeId, GraphError> {
    graph.apply_single(key, &[input], Attributes::new().with(VALUE, value))
}

pub fn add_scalar(graph: &mut Graph, input: NodeId, value: f64) -> Result<NodeId, GraphError> {
    apply(graph, ADDITION_SCALAR, input, value)
}

pub fn subtract_scalar(graph: &mut Graph, input: NodeId, value: f64) -> Result<NodeId, GraphError> {
    apply(graph, SUBTRACTION_SCALAR, input, value)
}

pub fn multiply_scalar(graph: &mut Graph, input: NodeId, value: f64) -> Result<NodeId, GraphError> {
    apply(graph, MULTIPLICATION_SCALAR, input, value)
}

pub fn divide_scalar(graph: &mut Graph, input: NodeId, value: f64) -> Result<NodeId, GraphError> {
    apply(graph, DIVISION_SCALAR, input, value)
}
