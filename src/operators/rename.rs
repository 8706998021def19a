// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashSet};

use crate::errors::{GraphError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::operators::{
    AttributeDef, AttributeType, AttributeValue, Attributes, FeatureConstraint, OperatorContext,
    OperatorDefinition, OperatorRegistry,
};
use crate::schema::{FeatureSchema, IndexSchema, Schema};

pub const RENAME: &str = "RENAME";
pub const FEATURES: &str = "features";
pub const INDEX: &str = "index";

pub fn register(registry: &mut OperatorRegistry) -> Result<(), RegistryError> {
    registry.register(
        OperatorDefinition::new(RENAME, infer)
            .input("input", FeatureConstraint::Any)
            .output("output")
            .attribute(AttributeDef::optional(
                FEATURES,
                AttributeType::StringMap,
                AttributeValue::StringMap(BTreeMap::new()),
            ))
            .attribute(AttributeDef::optional(
                INDEX,
                AttributeType::StringMap,
                AttributeValue::StringMap(BTreeMap::new()),
            )),
    )
}

fn infer(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    let input = ctx.input(0);
    let empty = BTreeMap::new();
    let feature_map = ctx.attributes.string_map(FEATURES).unwrap_or(&empty);
    let index_map = ctx.attributes.string_map(INDEX).unwrap_or(&empty);

    let features = renamed(
        ctx,
        FEATURES,
        feature_map,
        input.features.iter().map(|f| (f.name.as_str(), f.dtype)),
    )?
    .into_iter()
    .map(|(name, dtype)| FeatureSchema::new(name, dtype))
    .collect();

    let indexes = renamed(
        ctx,
        INDEX,
        index_map,
        input.indexes.iter().map(|i| (i.name.as_str(), i.dtype)),
    )?
    .into_iter()
    .map(|(name, dtype)| IndexSchema { name, dtype })
    .collect();

    Ok(vec![Schema {
        features,
        indexes,
        is_unix_timestamp: input.is_unix_timestamp,
    }])
}

fn renamed<'a, T>(
    ctx: &OperatorContext<'_>,
    attribute: &str,
    mapping: &BTreeMap<String, String>,
    columns: impl Iterator<Item = (&'a str, T)>,
) -> Result<Vec<(String, T)>, GraphError> {
    let columns: Vec<(&str, T)> = columns.collect();

    if let Some(unknown) = mapping.keys().find(|k| !columns.iter().any(|(n, _)| *n == k.as_str())) {
        return Err(ctx.attribute_error(
            attribute,
            format!("cannot rename '{}': no such column", unknown),
        ));
    }

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(columns.len());
    for (name, dtype) in columns {
        let new_name = mapping.get(name).cloned().unwrap_or_else(|| name.to_string());
        if new_name.is_empty() {
            return Err(ctx.attribute_error(attribute, format!("cannot rename '{}' to an empty name", name)));
        }
        if !seen.insert(new_name.clone()) {
            return Err(ctx.attribute_error(
                attribute,
                format!("renaming produces duplicate name '{}'", new_name),
            ));
        }
        out.push((new_name, dtype));
    }
    Ok(out)
}

pub fn rename(
    graph: &mut Graph,
    input: NodeId,
    features: BTreeMap<String, String>,
    index: BTreeMap<String, String>,
) -> Result<NodeId, GraphError> {
    graph.apply_single(
        RENAME,
        &[input],
        Attributes::new().with(FEATURES, features).with(INDEX, index),
    )
}
