// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::data::{Column, IndexKey};
use crate::errors::EventSetError;
use crate::schema::Schema;

/// Timestamps and feature columns of one index key.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexData {
    pub timestamps: Vec<f64>,
    pub features: Vec<Column>,
}

impl IndexData {
    pub fn new(timestamps: Vec<f64>, features: Vec<Column>) -> Self {
        Self {
            timestamps,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// An indexed event collection.
///
/// Keys are kept in a `BTreeMap` so every backend iterates them in the same
/// order and produces identical outputs for identical inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSet {
    schema: Schema,
    data: BTreeMap<IndexKey, IndexData>,
}

impl EventSet {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            data: BTreeMap::new(),
        }
    }

    /// Builder used by tests and data loaders.
    pub fn with_group(
        mut self,
        key: impl Into<IndexKey>,
        timestamps: Vec<f64>,
        features: Vec<Column>,
    ) -> Self {
        self.insert(key.into(), IndexData::new(timestamps, features));
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn insert(&mut self, key: IndexKey, data: IndexData) -> Option<IndexData> {
        self.data.insert(key, data)
    }

    pub fn get(&self, key: &IndexKey) -> Option<&IndexData> {
        self.data.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndexKey, &IndexData)> {
        self.data.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &IndexKey> {
        self.data.keys()
    }

    /// Number of index keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total number of events across all index keys.
    pub fn num_events(&self) -> usize {
        self.data.values().map(IndexData::len).sum()
    }

    pub fn into_parts(self) -> (Schema, BTreeMap<IndexKey, IndexData>) {
        (self.schema, self.data)
    }

    /// Same data under a different schema; used by operators that only rename.
    pub fn with_schema(self, schema: Schema) -> EventSet {
        EventSet {
            schema,
            data: self.data,
        }
    }

    /// Checks every invariant an operator is allowed to assume about its input.
    pub fn validate(&self) -> Result<(), EventSetError> {
        let index_arity = self.schema.indexes.len();
        let feature_count = self.schema.features.len();

        for (key, data) in &self.data {
            if key.len() != index_arity {
                return Err(EventSetError::KeyArity {
                    key: key.to_string(),
                    expected: index_arity,
                    actual: key.len(),
                });
            }
            for (value, index) in key.values().iter().zip(&self.schema.indexes) {
                if !value.matches(index.dtype) {
                    return Err(EventSetError::KeyType {
                        key: key.to_string(),
                        index: index.name.clone(),
                        dtype: index.dtype,
                    });
                }
            }

            if data.features.len() != feature_count {
                return Err(EventSetError::FeatureCount {
                    key: key.to_string(),
                    expected: feature_count,
                    actual: data.features.len(),
                });
            }
            for (column, feature) in data.features.iter().zip(&self.schema.features) {
                if column.dtype() != feature.dtype {
                    return Err(EventSetError::TypeMismatch {
                        key: key.to_string(),
                        feature: feature.name.clone(),
                        expected: feature.dtype,
                        actual: column.dtype(),
                    });
                }
                if column.len() != data.timestamps.len() {
                    return Err(EventSetError::LengthMismatch {
                        key: key.to_string(),
                        feature: feature.name.clone(),
                        expected: data.timestamps.len(),
                        actual: column.len(),
                    });
                }
            }

            if let Some(timestamp) = data.timestamps.iter().find(|t| !t.is_finite()) {
                return Err(EventSetError::NonFiniteTimestamp {
                    key: key.to_string(),
                    timestamp: *timestamp,
                });
            }
            if data.timestamps.windows(2).any(|pair| pair[0] > pair[1]) {
                return Err(EventSetError::UnsortedTimestamps {
                    key: key.to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::IndexValue;
    use crate::schema::{FeatureSchema, FeatureType, IndexSchema};

    fn schema() -> Schema {
        Schema::new(
            vec![FeatureSchema::new("price", FeatureType::Float64)],
            vec![IndexSchema::new("store", FeatureType::String).unwrap()],
        )
    }

    fn key(store: &str) -> IndexKey {
        IndexKey::from(vec![IndexValue::from(store)])
    }

    #[test]
    fn test_valid_collection() {
        let events = EventSet::new(schema())
            .with_group(key("A"), vec![1.0, 2.0, 2.0], vec![Column::from(vec![1.0, 2.0, 3.0])])
            .with_group(key("B"), vec![], vec![Column::from(Vec::<f64>::new())]);

        assert!(events.validate().is_ok());
        assert_eq!(events.len(), 2);
        assert_eq!(events.num_events(), 3);
    }

    #[test]
    fn test_validation_failures() {
        let cases = vec![
            (
                "short column",
                EventSet::new(schema()).with_group(
                    key("A"),
                    vec![1.0, 2.0],
                    vec![Column::from(vec![1.0])],
                ),
            ),
            (
                "wrong dtype",
                EventSet::new(schema()).with_group(
                    key("A"),
                    vec![1.0],
                    vec![Column::Int64(vec![1])],
                ),
            ),
            (
                "missing column",
                EventSet::new(schema()).with_group(key("A"), vec![1.0], vec![]),
            ),
            (
                "key arity",
                EventSet::new(schema()).with_group(
                    IndexKey::empty(),
                    vec![1.0],
                    vec![Column::from(vec![1.0])],
                ),
            ),
            (
                "key type",
                EventSet::new(schema()).with_group(
                    IndexKey::from(vec![IndexValue::Int(1)]),
                    vec![1.0],
                    vec![Column::from(vec![1.0])],
                ),
            ),
            (
                "unsorted",
                EventSet::new(schema()).with_group(
                    key("A"),
                    vec![2.0, 1.0],
                    vec![Column::from(vec![1.0, 2.0])],
                ),
            ),
        ];

        for (name, events) in cases {
            assert!(events.validate().is_err(), "case '{}' should fail", name);
        }
    }

    #[test]
    fn test_non_finite_timestamps_are_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let events = EventSet::new(schema()).with_group(
                key("A"),
                vec![1.0, bad, 3.0],
                vec![Column::from(vec![1.0, 2.0, 3.0])],
            );
            assert!(
                matches!(
                    events.validate(),
                    Err(EventSetError::NonFiniteTimestamp { .. })
                ),
                "timestamp {}",
                bad
            );
        }
    }

    #[test]
    fn test_with_schema_keeps_data() {
        let events = EventSet::new(schema()).with_group(
            key("A"),
            vec![1.0],
            vec![Column::from(vec![5.0])],
        );
        let renamed_schema = schema().with_features(vec![FeatureSchema::new("cost", FeatureType::Float64)]);
        let renamed = events.clone().with_schema(renamed_schema.clone());
        assert_eq!(renamed.schema(), &renamed_schema);
        assert_eq!(renamed.get(&key("A")), events.get(&key("A")));
    }
}
