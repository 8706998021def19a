// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! JSON leaf data files.
//!
//! ```json
//! { "groups": [
//!     { "key": ["A"], "timestamps": [1, 2], "features": { "price": [10.0, 11.5] } }
//! ] }
//! ```
//!
//! Events inside a group may be listed in any order; they are sorted by
//! timestamp on load. A `null` in a float column loads as NaN.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::config::{Config, Pipeline};
use crate::data::{Column, EventSet, IndexData, IndexKey, IndexValue};
use crate::engine::LeafBindings;
use crate::errors::ConfigError;
use crate::schema::{FeatureType, Schema};

#[derive(Debug, Default, Deserialize, Serialize)]
struct EventSetFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<Schema>,
    groups: Vec<GroupFile>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GroupFile {
    #[serde(default)]
    key: Vec<Json>,
    timestamps: Vec<f64>,
    #[serde(default)]
    features: BTreeMap<String, Vec<Json>>,
}

/// Parses leaf data in the JSON group format against the leaf's schema.
pub fn parse_event_set(leaf: &str, schema: &Schema, json: &str) -> Result<EventSet, ConfigError> {
    let file: EventSetFile = serde_json::from_str(json)?;
    let invalid = |reason: String| ConfigError::InvalidLeaf {
        leaf: leaf.to_string(),
        reason,
    };

    let mut events = EventSet::new(schema.clone());
    for group in file.groups {
        let key = parse_key(schema, &group.key).map_err(&invalid)?;

        if let Some(unknown) = group.features.keys().find(|name| schema.feature(name).is_none()) {
            return Err(invalid(format!("group {} has undeclared feature '{}'", key, unknown)));
        }

        let order = sort_order(&group.timestamps);
        let timestamps = order.iter().map(|&i| group.timestamps[i]).collect();

        let mut features = Vec::with_capacity(schema.features.len());
        for feature in &schema.features {
            let values = group.features.get(&feature.name).ok_or_else(|| {
                invalid(format!("group {} is missing feature '{}'", key, feature.name))
            })?;
            if values.len() != order.len() {
                return Err(invalid(format!(
                    "group {} feature '{}' has {} values for {} timestamps",
                    key,
                    feature.name,
                    values.len(),
                    order.len()
                )));
            }
            let sorted: Vec<&Json> = order.iter().map(|&i| &values[i]).collect();
            let column = parse_column(feature.dtype, &sorted).map_err(|reason| {
                invalid(format!("group {} feature '{}': {}", key, feature.name, reason))
            })?;
            features.push(column);
        }

        let display = key.to_string();
        if events.insert(key, IndexData::new(timestamps, features)).is_some() {
            return Err(invalid(format!("group {} appears more than once", display)));
        }
    }

    events.validate().map_err(|e| invalid(e.to_string()))?;
    Ok(events)
}

/// Reads and parses a leaf data file.
pub fn load_event_set<P: AsRef<Path>>(leaf: &str, schema: &Schema, path: P) -> Result<EventSet, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_event_set(leaf, schema, &content)
}

/// Loads every leaf of `config` that names a data file. Leaves without one
/// are left unbound for the caller to supply.
pub fn load_leaf_bindings(config: &Config, pipeline: &Pipeline) -> Result<LeafBindings, ConfigError> {
    let mut bindings = LeafBindings::new();
    for leaf in &config.leaves {
        let Some(path) = config.data_path(leaf) else {
            continue;
        };
        let node = pipeline.leaf(&leaf.id).ok_or_else(|| ConfigError::InvalidLeaf {
            leaf: leaf.id.clone(),
            reason: "leaf is not part of the pipeline".to_string(),
        })?;
        let schema = pipeline.graph().schema(node)?;
        bindings.bind(node, load_event_set(&leaf.id, schema, path)?);
    }
    Ok(bindings)
}

/// Renders an event set in the same group format, with its schema attached.
pub fn event_set_to_json(events: &EventSet) -> Json {
    let schema = events.schema();
    let groups = events
        .iter()
        .map(|(key, data)| GroupFile {
            key: key.values().iter().map(index_value_to_json).collect(),
            timestamps: data.timestamps.clone(),
            features: schema
                .features
                .iter()
                .zip(&data.features)
                .map(|(feature, column)| (feature.name.clone(), column_to_json(column)))
                .collect(),
        })
        .collect();

    let file = EventSetFile {
        schema: Some(schema.clone()),
        groups,
    };
    serde_json::to_value(file).unwrap_or(Json::Null)
}

fn parse_key(schema: &Schema, values: &[Json]) -> Result<IndexKey, String> {
    if values.len() != schema.indexes.len() {
        return Err(format!(
            "key {:?} has {} values, the schema declares {} indexes",
            values,
            values.len(),
            schema.indexes.len()
        ));
    }
    values
        .iter()
        .zip(&schema.indexes)
        .map(|(value, index)| {
            let parsed = match index.dtype {
                FeatureType::String => value.as_str().map(IndexValue::from),
                _ => value.as_i64().map(IndexValue::Int),
            };
            parsed.ok_or_else(|| format!("key value {} is not a valid {} for index '{}'", value, index.dtype, index.name))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(IndexKey::new)
}

fn sort_order(timestamps: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..timestamps.len()).collect();
    order.sort_by(|&a, &b| timestamps[a].total_cmp(&timestamps[b]));
    order
}

fn parse_column(dtype: FeatureType, values: &[&Json]) -> Result<Column, String> {
    let mismatch = |value: &Json| format!("{} is not a valid {}", value, dtype);

    let column = match dtype {
        FeatureType::Float64 => Column::Float64(
            values
                .iter()
                .map(|v| float_or_nan(v).ok_or_else(|| mismatch(v)))
                .collect::<Result<_, _>>()?,
        ),
        FeatureType::Float32 => Column::Float32(
            values
                .iter()
                .map(|v| float_or_nan(v).map(|x| x as f32).ok_or_else(|| mismatch(v)))
                .collect::<Result<_, _>>()?,
        ),
        FeatureType::Int64 => Column::Int64(
            values
                .iter()
                .map(|v| v.as_i64().ok_or_else(|| mismatch(v)))
                .collect::<Result<_, _>>()?,
        ),
        FeatureType::Int32 => Column::Int32(
            values
                .iter()
                .map(|v| {
                    v.as_i64()
                        .and_then(|x| i32::try_from(x).ok())
                        .ok_or_else(|| mismatch(v))
                })
                .collect::<Result<_, _>>()?,
        ),
        FeatureType::String => Column::String(
            values
                .iter()
                .map(|v| v.as_str().map(str::to_string).ok_or_else(|| mismatch(v)))
                .collect::<Result<_, _>>()?,
        ),
        FeatureType::Boolean => Column::Boolean(
            values
                .iter()
                .map(|v| v.as_bool().ok_or_else(|| mismatch(v)))
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(column)
}

fn float_or_nan(value: &Json) -> Option<f64> {
    if value.is_null() {
        Some(f64::NAN)
    } else {
        value.as_f64()
    }
}

fn index_value_to_json(value: &IndexValue) -> Json {
    match value {
        IndexValue::Int(v) => Json::from(*v),
        IndexValue::Str(v) => Json::from(v.as_str()),
    }
}

/// NaN and infinities have no JSON number form and render as `null`.
fn column_to_json(column: &Column) -> Vec<Json> {
    match column {
        Column::Float64(v) => v.iter().map(|x| Json::from(*x)).collect(),
        Column::Float32(v) => v.iter().map(|x| Json::from(*x as f64)).collect(),
        Column::Int64(v) => v.iter().map(|x| Json::from(*x)).collect(),
        Column::Int32(v) => v.iter().map(|x| Json::from(*x)).collect(),
        Column::String(v) => v.iter().map(|x| Json::from(x.as_str())).collect(),
        Column::Boolean(v) => v.iter().map(|x| Json::from(*x)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FeatureSchema, IndexSchema};

    fn schema() -> Schema {
        Schema::new(
            vec![
                FeatureSchema::new("price", FeatureType::Float64),
                FeatureSchema::new("qty", FeatureType::Int32),
            ],
            vec![IndexSchema::new("store", FeatureType::String).unwrap()],
        )
    }

    fn store(name: &str) -> IndexKey {
        IndexKey::from(vec![IndexValue::from(name)])
    }

    #[test]
    fn test_parse_sorts_events_by_timestamp() {
        let json = r#"{ "groups": [
            { "key": ["A"], "timestamps": [3, 1, 2],
              "features": { "price": [30.0, 10.0, null], "qty": [3, 1, 2] } },
            { "key": ["B"], "timestamps": [],
              "features": { "price": [], "qty": [] } }
        ] }"#;

        let events = parse_event_set("sales", &schema(), json).unwrap();
        assert_eq!(events.len(), 2);

        let a = events.get(&store("A")).unwrap();
        assert_eq!(a.timestamps, vec![1.0, 2.0, 3.0]);
        assert_eq!(a.features[1], Column::Int32(vec![1, 2, 3]));
        match &a.features[0] {
            Column::Float64(v) => {
                assert_eq!(v[0], 10.0);
                assert!(v[1].is_nan());
                assert_eq!(v[2], 30.0);
            }
            other => panic!("unexpected column {:?}", other),
        }
        assert!(events.get(&store("B")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_groups() {
        let cases = [
            ("missing feature", r#"{ "groups": [{ "key": ["A"], "timestamps": [1], "features": { "price": [1.0] } }] }"#),
            ("extra feature", r#"{ "groups": [{ "key": ["A"], "timestamps": [1], "features": { "price": [1.0], "qty": [1], "x": [1] } }] }"#),
            ("short column", r#"{ "groups": [{ "key": ["A"], "timestamps": [1, 2], "features": { "price": [1.0], "qty": [1, 2] } }] }"#),
            ("wrong type", r#"{ "groups": [{ "key": ["A"], "timestamps": [1], "features": { "price": ["x"], "qty": [1] } }] }"#),
            ("int32 overflow", r#"{ "groups": [{ "key": ["A"], "timestamps": [1], "features": { "price": [1.0], "qty": [4294967296] } }] }"#),
            ("key type", r#"{ "groups": [{ "key": [7], "timestamps": [1], "features": { "price": [1.0], "qty": [1] } }] }"#),
            ("key arity", r#"{ "groups": [{ "key": [], "timestamps": [1], "features": { "price": [1.0], "qty": [1] } }] }"#),
            ("duplicate key", r#"{ "groups": [
                { "key": ["A"], "timestamps": [], "features": { "price": [], "qty": [] } },
                { "key": ["A"], "timestamps": [], "features": { "price": [], "qty": [] } }] }"#),
        ];

        for (name, json) in cases {
            let result = parse_event_set("sales", &schema(), json);
            assert!(
                matches!(result, Err(ConfigError::InvalidLeaf { .. })),
                "case '{}' should be rejected, got {:?}",
                name,
                result
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        let result = parse_event_set("sales", &schema(), "{ not json");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        std::fs::write(
            &path,
            r#"{ "groups": [{ "key": ["A"], "timestamps": [1], "features": { "price": [2.5], "qty": [4] } }] }"#,
        )
        .unwrap();

        let events = load_event_set("sales", &schema(), &path).unwrap();
        assert_eq!(events.num_events(), 1);
    }

    #[test]
    fn test_output_json_shape() {
        let events = EventSet::new(schema()).with_group(
            store("A"),
            vec![1.0, 2.0],
            vec![Column::from(vec![f64::NAN, 2.5]), Column::from(vec![1i32, 2])],
        );
        let json = event_set_to_json(&events);

        assert_eq!(json["schema"]["features"][1]["dtype"], "int32");
        let group = &json["groups"][0];
        assert_eq!(group["key"][0], "A");
        assert_eq!(group["timestamps"][1], 2.0);
        assert!(group["features"]["price"][0].is_null());
        assert_eq!(group["features"]["qty"][1], 2);
    }
}
