// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Moving-window aggregations over the trailing interval `(t - window_length, t]`.
//!
//! Without a `sampling` input, every input event is evaluated. With one, the
//! output takes the sampling's index keys and timestamps and each window is
//! evaluated over the input events of the same index key.

use crate::errors::{GraphError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::operators::{
    AttributeDef, AttributeType, Attributes, FeatureConstraint, OperatorContext,
    OperatorDefinition, OperatorRegistry,
};
use crate::schema::{FeatureSchema, FeatureType, Schema};

pub const MOVING_SUM: &str = "MOVING_SUM";
pub const MOVING_STANDARD_DEVIATION: &str = "MOVING_STANDARD_DEVIATION";

pub const WINDOW_LENGTH: &str = "window_length";
pub const SAMPLING: &str = "sampling";

pub fn register(registry: &mut OperatorRegistry) -> Result<(), RegistryError> {
    registry.register(definition(MOVING_SUM, infer_sum))?;
    registry.register(definition(MOVING_STANDARD_DEVIATION, infer_standard_deviation))?;
    Ok(())
}

fn definition(
    key: &'static str,
    infer: fn(&OperatorContext<'_>) -> Result<Vec<Schema>, GraphError>,
) -> OperatorDefinition {
    OperatorDefinition::new(key, infer)
        .input("input", FeatureConstraint::Numeric)
        .optional_input(SAMPLING, FeatureConstraint::Any)
        .output("output")
        .attribute(AttributeDef::required(WINDOW_LENGTH, AttributeType::Float))
}

/// Sums keep the input type.
fn infer_sum(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    infer(ctx, |dtype| dtype)
}

/// Deviations are float32 for float32 input and float64 otherwise.
fn infer_standard_deviation(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    infer(ctx, |dtype| match dtype {
        FeatureType::Float32 => FeatureType::Float32,
        _ => FeatureType::Float64,
    })
}

fn infer(
    ctx: &OperatorContext<'_>,
    output_dtype: fn(FeatureType) -> FeatureType,
) -> Result<Vec<Schema>, GraphError> {
    match ctx.attributes.float(WINDOW_LENGTH) {
        Some(w) if w > 0.0 => {}
        Some(w) => {
            return Err(ctx.attribute_error(
                WINDOW_LENGTH,
                format!("window length must be strictly positive, got {}", w),
            ))
        }
        None => return Err(ctx.attribute_error(WINDOW_LENGTH, "missing required attribute")),
    }

    let input = ctx.input(0);
    if let Some(sampling) = ctx.inputs.get(1) {
        if !input.same_index(sampling) {
            return Err(ctx.type_error(
                "input and sampling must have the same index; re-index one of them first",
            ));
        }
    }

    let features = input
        .features
        .iter()
        .map(|f| FeatureSchema::new(f.name.clone(), output_dtype(f.dtype)))
        .collect();
    Ok(vec![input.with_features(features)])
}

fn apply(
    graph: &mut Graph,
    key: &str,
    input: NodeId,
    window_length: f64,
    sampling: Option<NodeId>,
) -> Result<NodeId, GraphError> {
    let inputs: Vec<NodeId> = std::iter::once(input).chain(sampling).collect();
    graph.apply_single(
        key,
        &inputs,
        Attributes::new().with(WINDOW_LENGTH, window_length),
    )
}

/// Sum of each feature over the window `(t - window_length, t]`, evaluated at
/// every input event or at every `sampling` event.
pub fn moving_sum(
    graph: &mut Graph,
    input: NodeId,
    window_length: f64,
    sampling: Option<NodeId>,
) -> Result<NodeId, GraphError> {
    apply(graph, MOVING_SUM, input, window_length, sampling)
}

/// Running total since the first event.
pub fn cumsum(graph: &mut Graph, input: NodeId, sampling: Option<NodeId>) -> Result<NodeId, GraphError> {
    moving_sum(graph, input, f64::INFINITY, sampling)
}

/// Population standard deviation of each feature over the window. Empty
/// windows yield NaN.
pub fn moving_standard_deviation(
    graph: &mut Graph,
    input: NodeId,
    window_length: f64,
    sampling: Option<NodeId>,
) -> Result<NodeId, GraphError> {
    apply(graph, MOVING_STANDARD_DEVIATION, input, window_length, sampling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IndexSchema;

    fn graph() -> Graph {
        Graph::new(OperatorRegistry::with_builtins().unwrap().freeze())
    }

    fn schema(features: &[(&str, FeatureType)]) -> Schema {
        Schema::new(
            features
                .iter()
                .map(|(n, t)| FeatureSchema::new(*n, *t))
                .collect(),
            vec![IndexSchema::new("store", FeatureType::String).unwrap()],
        )
    }

    #[test]
    fn test_window_length_validation() {
        let mut g = graph();
        let input = g.leaf("in", schema(&[("x", FeatureType::Int32)]));

        let out = moving_sum(&mut g, input, 5.0, None).unwrap();
        assert_eq!(g.schema(out).unwrap(), g.schema(input).unwrap());
        assert!(cumsum(&mut g, input, None).is_ok());

        for bad in [0.0, -1.0, f64::NAN] {
            assert!(
                matches!(
                    moving_sum(&mut g, input, bad, None),
                    Err(GraphError::InvalidAttribute { .. })
                ),
                "window {}",
                bad
            );
            assert!(
                matches!(
                    moving_standard_deviation(&mut g, input, bad, None),
                    Err(GraphError::InvalidAttribute { .. })
                ),
                "window {}",
                bad
            );
        }
    }

    #[test]
    fn test_standard_deviation_output_types() {
        let mut g = graph();
        let input = g.leaf(
            "in",
            schema(&[
                ("a", FeatureType::Float32),
                ("b", FeatureType::Float64),
                ("c", FeatureType::Int32),
                ("d", FeatureType::Int64),
            ]),
        );

        let out = moving_standard_deviation(&mut g, input, 10.0, None).unwrap();
        let dtypes: Vec<FeatureType> = g
            .schema(out)
            .unwrap()
            .features
            .iter()
            .map(|f| f.dtype)
            .collect();
        assert_eq!(
            dtypes,
            vec![
                FeatureType::Float32,
                FeatureType::Float64,
                FeatureType::Float64,
                FeatureType::Float64
            ]
        );
    }

    #[test]
    fn test_sampling_must_share_index() {
        let mut g = graph();
        let input = g.leaf("in", schema(&[("x", FeatureType::Float64)]));
        let ticks = g.leaf("ticks", schema(&[("flag", FeatureType::Boolean)]));
        let unindexed = g.leaf(
            "global",
            Schema::new(vec![FeatureSchema::new("flag", FeatureType::Boolean)], vec![]),
        );

        let out = moving_sum(&mut g, input, 5.0, Some(ticks)).unwrap();
        assert_eq!(g.schema(out).unwrap(), g.schema(input).unwrap());
        assert_eq!(g.producer(out).unwrap().inputs, vec![input, ticks]);

        assert!(matches!(
            moving_standard_deviation(&mut g, input, 5.0, Some(unindexed)),
            Err(GraphError::TypeContract { .. })
        ));
    }
}
