// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{GraphError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::operators::{
    AttributeDef, AttributeType, Attributes, FeatureConstraint, OperatorContext,
    OperatorDefinition, OperatorRegistry,
};
use crate::schema::Schema;

pub const SELECT: &str = "SELECT";
pub const FEATURE_NAMES: &str = "feature_names";

pub fn register(registry: &mut OperatorRegistry) -> Result<(), RegistryError> {
    registry.register(
        OperatorDefinition::new(SELECT, infer)
            .input("input", FeatureConstraint::Any)
            .output("output")
            .attribute(AttributeDef::required(FEATURE_NAMES, AttributeType::StringList)),
    )
}

/// Output features in the requested order.
fn infer(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    let input = ctx.input(0);
    let names = ctx.attributes.string_list(FEATURE_NAMES).unwrap_or_default();

    let mut features = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(ctx.attribute_error(
                FEATURE_NAMES,
                format!("feature '{}' is selected more than once", name),
            ));
        }
        let feature = input.feature(name).ok_or_else(|| {
            ctx.type_error(format!(
                "feature '{}' does not exist in input; available features are [{}]",
                name,
                input.feature_names().join(", ")
            ))
        })?;
        features.push(feature.clone());
    }

    Ok(vec![input.with_features(features)])
}

pub fn select<S: AsRef<str>>(
    graph: &mut Graph,
    input: NodeId,
    feature_names: &[S],
) -> Result<NodeId, GraphError> {
    let names: Vec<String> = feature_names.iter().map(|n| n.as_ref().to_string()).collect();
    graph.apply_single(SELECT, &[input], Attributes::new().with(FEATURE_NAMES, names))
}
