// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::schema::FeatureType;

/// One component of an index key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexValue {
    Int(i64),
    Str(String),
}

impl IndexValue {
    pub fn matches(&self, dtype: FeatureType) -> bool {
        match self {
            IndexValue::Int(_) => dtype.is_integer(),
            IndexValue::Str(_) => dtype == FeatureType::String,
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexValue::Int(v) => write!(f, "{}", v),
            IndexValue::Str(v) => write!(f, "{:?}", v),
        }
    }
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        IndexValue::Str(value.to_string())
    }
}

impl From<String> for IndexValue {
    fn from(value: String) -> Self {
        IndexValue::Str(value)
    }
}

impl From<i64> for IndexValue {
    fn from(value: i64) -> Self {
        IndexValue::Int(value)
    }
}

/// Tuple of index values identifying one entity. The empty key is used by
/// collections without an index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct IndexKey(pub Vec<IndexValue>);

impl IndexKey {
    pub fn new(values: Vec<IndexValue>) -> Self {
        Self(values)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[IndexValue] {
        &self.0
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<IndexValue>> for IndexKey {
    fn from(values: Vec<IndexValue>) -> Self {
        Self(values)
    }
}

/// A single feature cell, used by row-oriented code.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float64(f64),
    Float32(f32),
    Int64(i64),
    Int32(i32),
    String(String),
    Boolean(bool),
}

impl Value {
    pub fn dtype(&self) -> FeatureType {
        match self {
            Value::Float64(_) => FeatureType::Float64,
            Value::Float32(_) => FeatureType::Float32,
            Value::Int64(_) => FeatureType::Int64,
            Value::Int32(_) => FeatureType::Int32,
            Value::String(_) => FeatureType::String,
            Value::Boolean(_) => FeatureType::Boolean,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            Value::Float32(v) => Some(*v as f64),
            Value::Int64(v) => Some(*v as f64),
            Value::Int32(v) => Some(*v as f64),
            Value::String(_) | Value::Boolean(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        assert_eq!(IndexKey::from(vec!["A".into()]).to_string(), "(\"A\",)");
        assert_eq!(
            IndexKey::from(vec!["A".into(), IndexValue::Int(3)]).to_string(),
            "(\"A\", 3)"
        );
        assert_eq!(IndexKey::empty().to_string(), "()");
    }

    #[test]
    fn test_keys_order_deterministically() {
        let mut keys = vec![
            IndexKey::from(vec!["b".into()]),
            IndexKey::from(vec!["a".into()]),
        ];
        keys.sort();
        assert_eq!(keys[0], IndexKey::from(vec!["a".into()]));
    }

    #[test]
    fn test_index_value_matches_dtype() {
        assert!(IndexValue::Int(1).matches(FeatureType::Int32));
        assert!(!IndexValue::Int(1).matches(FeatureType::String));
        assert!(IndexValue::from("x").matches(FeatureType::String));
    }

    #[test]
    fn test_value_widening() {
        assert_eq!(Value::Int32(4).as_f64(), Some(4.0));
        assert_eq!(Value::Boolean(true).as_f64(), None);
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
    }
}
