// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{GraphError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::operators::{
    AttributeDef, AttributeType, Attributes, FeatureConstraint, OperatorContext,
    OperatorDefinition, OperatorRegistry,
};
use crate::schema::{FeatureSchema, FeatureType, Schema};

pub const CAST: &str = "CAST";
pub const DTYPE: &str = "dtype";

pub fn register(registry: &mut OperatorRegistry) -> Result<(), RegistryError> {
    registry.register(
        OperatorDefinition::new(CAST, infer)
            .input("input", FeatureConstraint::Any)
            .output("output")
            .attribute(AttributeDef::required(DTYPE, AttributeType::String)),
    )
}

/// Target type named by the `dtype` attribute.
pub fn target_dtype(attributes: &Attributes) -> Option<FeatureType> {
    attributes.string(DTYPE).and_then(|s| s.parse().ok())
}

/// Strings only convert to and from strings.
pub fn can_cast(from: FeatureType, to: FeatureType) -> bool {
    (from == FeatureType::String) == (to == FeatureType::String)
}

fn infer(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    let input = ctx.input(0);
    let target = target_dtype(ctx.attributes).ok_or_else(|| {
        ctx.attribute_error(
            DTYPE,
            format!(
                "'{}' is not a feature type",
                ctx.attributes.string(DTYPE).unwrap_or_default()
            ),
        )
    })?;

    let mut features = Vec::with_capacity(input.features.len());
    for feature in &input.features {
        if !can_cast(feature.dtype, target) {
            return Err(ctx.type_error(format!(
                "cannot cast feature '{}' from {} to {}",
                feature.name, feature.dtype, target
            )));
        }
        features.push(FeatureSchema::new(feature.name.clone(), target));
    }

    Ok(vec![input.with_features(features)])
}

pub fn cast(graph: &mut Graph, input: NodeId, dtype: FeatureType) -> Result<NodeId, GraphError> {
    graph.apply_single(CAST, &[input], Attributes::new().with(DTYPE, dtype.as_str()))
}
