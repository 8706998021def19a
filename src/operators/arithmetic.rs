// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Element-wise arithmetic between two collections sharing the same
//! sampling. Features are paired by position.

use crate::errors::{GraphError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::operators::{
    Attributes, FeatureConstraint, OperatorContext, OperatorDefinition, OperatorRegistry,
};
use crate::schema::{FeatureSchema, Schema};

pub const ADDITION: &str = "ADDITION";
pub const SUBTRACTION: &str = "SUBTRACTION";
pub const MULTIPLICATION: &str = "MULTIPLICATION";
pub const DIVISION: &str = "DIVISION";

/// Output feature name prefix for each binary key.
pub fn prefix(key: &str) -> Option<&'static str> {
    match key {
        ADDITION => Some("add"),
        SUBTRACTION => Some("sub"),
        MULTIPLICATION => Some("mult"),
        DIVISION => Some("div"),
        _ => None,
    }
}

pub fn register(registry: &mut OperatorRegistry) -> Result<(), RegistryError> {
    registry.register(definition(ADDITION, infer_addition, FeatureConstraint::Numeric))?;
    registry.register(definition(SUBTRACTION, infer_subtraction, FeatureConstraint::Numeric))?;
    registry.register(definition(
        MULTIPLICATION,
        infer_multiplication,
        FeatureConstraint::Numeric,
    ))?;
    registry.register(definition(DIVISION, infer_division, FeatureConstraint::Float))?;
    Ok(())
}

fn definition(
    key: &'static str,
    infer: crate::operators::InferFn,
    constraint: FeatureConstraint,
) -> OperatorDefinition {
    OperatorDefinition::new(key, infer)
        .input("input_1", constraint)
        .input("input_2", constraint)
        .output("output")
}

fn infer_addition(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    infer_binary(ctx, "add")
}

fn infer_subtraction(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    infer_binary(ctx, "sub")
}

fn infer_multiplication(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    infer_binary(ctx, "mult")
}

fn infer_division(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    infer_binary(ctx, "div")
}

fn infer_binary(ctx: &OperatorContext<'_>, prefix: &str) -> Result<Vec<Schema>, GraphError> {
    let (left, right) = (ctx.input(0), ctx.input(1));

    if !left.same_index(right) {
        return Err(ctx.type_error("input_1 and input_2 must have the same index"));
    }
    if left.features.len() != right.features.len() {
        return Err(ctx.type_error(format!(
            "input_1 and input_2 must have the same number of features, got {} and {}",
            left.features.len(),
            right.features.len()
        )));
    }

    let mut features = Vec::with_capacity(left.features.len());
    for (l, r) in left.features.iter().zip(&right.features) {
        if l.dtype != r.dtype {
            return Err(ctx.type_error(format!(
                "features '{}' ({}) and '{}' ({}) have different types. Cast one of them first",
                l.name, l.dtype, r.name, r.dtype
            )));
        }
        features.push(FeatureSchema::new(
            format!("{}_{}_{}", prefix, l.name, r.name),
            l.dtype,
        ));
    }

    Ok(vec![left.with_features(features)])
}

fn apply(graph: &mut Graph, key: &str, left: NodeId, right: NodeId) -> Result<NodeId, GraphError> {
    graph.apply_single(key, &[left, right], Attributes::new())
}

pub fn add(graph: &mut Graph, left: NodeId, right: NodeId) -> Result<NodeId, GraphError> {
    apply(graph, ADDITION, left, right)
}

pub fn subtract(graph: &mut Graph, left: NodeId, right: NodeId) -> Result<NodeId, GraphError> {
    apply(graph, SUBTRACTION, left, right)
}

pub fn multiply(graph: &mut Graph, left: NodeId, right: NodeId) -> Result<NodeId, GraphError> {
    apply(graph, MULTIPLICATION, left, right)
}

pub fn divide(graph: &mut Graph, numerator: NodeId, denominator: NodeId) -> Result<NodeId, GraphError> {
    apply(graph, DIVISION, numerator, denominator)
}
