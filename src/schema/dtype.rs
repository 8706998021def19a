// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scalar type of a feature column.
///
/// A column keeps exactly one `FeatureType` for its whole lifetime; operators
/// that change the type (e.g. `CAST`) produce a new column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Float64,
    Float32,
    Int64,
    Int32,
    String,
    Boolean,
}

impl FeatureType {
    pub fn is_float(self) -> bool {
        matches!(self, FeatureType::Float64 | FeatureType::Float32)
    }

    pub fn is_integer(self) -> bool {
        matches!(self, FeatureType::Int64 | FeatureType::Int32)
    }

    pub fn is_numeric(self) -> bool {
        self.is_float() || self.is_integer()
    }

    /// Whether `value` converts to this type without rounding or clamping.
    /// Always true for float types; false for non-numeric types.
    pub fn holds_exactly(self, value: f64) -> bool {
        match self {
            FeatureType::Float64 | FeatureType::Float32 => true,
            // Upper bounds are exclusive: 2^31 and 2^63 are exact as f64.
            FeatureType::Int32 => {
                value.fract() == 0.0 && value >= i32::MIN as f64 && value < -(i32::MIN as f64)
            }
            FeatureType::Int64 => {
                value.fract() == 0.0 && value >= i64::MIN as f64 && value < -(i64::MIN as f64)
            }
            FeatureType::String | FeatureType::Boolean => false,
        }
    }

    /// Types allowed for index key columns.
    pub fn is_valid_index(self) -> bool {
        matches!(
            self,
            FeatureType::Int64 | FeatureType::Int32 | FeatureType::String
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureType::Float64 => "float64",
            FeatureType::Float32 => "float32",
            FeatureType::Int64 => "int64",
            FeatureType::Int32 => "int32",
            FeatureType::String => "string",
            FeatureType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float64" => Ok(FeatureType::Float64),
            "float32" => Ok(FeatureType::Float32),
            "int64" => Ok(FeatureType::Int64),
            "int32" => Ok(FeatureType::Int32),
            "string" | "str" => Ok(FeatureType::String),
            "boolean" | "bool" => Ok(FeatureType::Boolean),
            other => Err(format!("unknown feature type '{}'", other)),
        }
    }
}
