// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::schema::FeatureType;

/// Name and type of one feature column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub name: String,
    pub dtype: FeatureType,
}

impl FeatureSchema {
    pub fn new(name: impl Into<String>, dtype: FeatureType) -> Self {
        Self {
            name: name.into(),
            dtype,
        }
    }
}

/// Name and type of one index key column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    pub name: String,
    pub dtype: FeatureType,
}

impl IndexSchema {
    /// Creates an index column, rejecting types that cannot identify an entity.
    pub fn new(name: impl Into<String>, dtype: FeatureType) -> Result<Self, String> {
        let name = name.into();
        if !dtype.is_valid_index() {
            return Err(format!(
                "index '{}' has type {}; index columns can only be int32, int64 or string",
                name, dtype
            ));
        }
        Ok(Self { name, dtype })
    }
}

/// Declared shape of an event collection: its features, its index key and
/// whether timestamps are unix epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub features: Vec<FeatureSchema>,
    #[serde(default)]
    pub indexes: Vec<IndexSchema>,
    #[serde(default)]
    pub is_unix_timestamp: bool,
}

impl Schema {
    pub fn new(features: Vec<FeatureSchema>, indexes: Vec<IndexSchema>) -> Self {
        Self {
            features,
            indexes,
            is_unix_timestamp: false,
        }
    }

    pub fn with_unix_timestamp(mut self, is_unix_timestamp: bool) -> Self {
        self.is_unix_timestamp = is_unix_timestamp;
        self
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureSchema> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn feature_position(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    /// Same index key shape (names and types, in order).
    pub fn same_index(&self, other: &Schema) -> bool {
        self.indexes == other.indexes
    }

    /// Copy of this schema with the features replaced.
    pub fn with_features(&self, features: Vec<FeatureSchema>) -> Schema {
        Schema {
            features,
            indexes: self.indexes.clone(),
            is_unix_timestamp: self.is_unix_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor_schema() -> Schema {
        Schema::new(
            vec![
                FeatureSchema::new("temperature", FeatureType::Float64),
                FeatureSchema::new("count", FeatureType::Int64),
            ],
            vec![IndexSchema::new("sensor", FeatureType::String).unwrap()],
        )
    }

    #[test]
    fn test_index_rejects_float() {
        let err = IndexSchema::new("price", FeatureType::Float64).unwrap_err();
        assert!(err.contains("price"));
    }

    #[test]
    fn test_feature_lookup() {
        let schema = sensor_schema();
        assert_eq!(schema.feature_position("count"), Some(1));
        assert_eq!(
            schema.feature("temperature").map(|f| f.dtype),
            Some(FeatureType::Float64)
        );
        assert!(schema.feature("missing").is_none());
        assert_eq!(schema.feature_names(), vec!["temperature", "count"]);
    }

    #[test]
    fn test_with_features_keeps_index() {
        let schema = sensor_schema().with_unix_timestamp(true);
        let derived = schema.with_features(vec![FeatureSchema::new("x", FeatureType::Int32)]);
        assert!(derived.same_index(&schema));
        assert!(derived.is_unix_timestamp);
        assert_eq!(derived.features.len(), 1);
    }
}
