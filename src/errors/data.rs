// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::schema::FeatureType;

/// Violations of the event collection invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventSetError {
    #[error("index key {key}: feature '{feature}' has {actual} values for {expected} timestamps")]
    LengthMismatch {
        key: String,
        feature: String,
        expected: usize,
        actual: usize,
    },

    #[error("index key {key}: feature '{feature}' holds {actual} values but is declared {expected}")]
    TypeMismatch {
        key: String,
        feature: String,
        expected: FeatureType,
        actual: FeatureType,
    },

    #[error("index key {key}: expected {expected} feature columns, found {actual}")]
    FeatureCount {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("index key {key}: expected {expected} index values, found {actual}")]
    KeyArity {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("index key {key}: value for index '{index}' does not match its type {dtype}")]
    KeyType {
        key: String,
        index: String,
        dtype: FeatureType,
    },

    #[error("index key {key}: timestamps are not sorted")]
    UnsortedTimestamps { key: String },

    #[error("index key {key}: timestamp {timestamp} is not a finite number")]
    NonFiniteTimestamp { key: String, timestamp: f64 },
}
