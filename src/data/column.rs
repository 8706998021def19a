// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::data::Value;
use crate::schema::FeatureType;

/// A typed feature column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float64(Vec<f64>),
    Float32(Vec<f32>),
    Int64(Vec<i64>),
    Int32(Vec<i32>),
    String(Vec<String>),
    Boolean(Vec<bool>),
}

/// Applies the same expression to whichever vector the column holds and
/// wraps the result back into the same variant.
macro_rules! map_column {
    ($column:expr, $values:ident => $body:expr) => {
        match $column {
            Column::Float64($values) => Column::Float64($body),
            Column::Float32($values) => Column::Float32($body),
            Column::Int64($values) => Column::Int64($body),
            Column::Int32($values) => Column::Int32($body),
            Column::String($values) => Column::String($body),
            Column::Boolean($values) => Column::Boolean($body),
        }
    };
}

impl Column {
    pub fn empty(dtype: FeatureType) -> Column {
        match dtype {
            FeatureType::Float64 => Column::Float64(Vec::new()),
            FeatureType::Float32 => Column::Float32(Vec::new()),
            FeatureType::Int64 => Column::Int64(Vec::new()),
            FeatureType::Int32 => Column::Int32(Vec::new()),
            FeatureType::String => Column::String(Vec::new()),
            FeatureType::Boolean => Column::Boolean(Vec::new()),
        }
    }

    pub fn dtype(&self) -> FeatureType {
        match self {
            Column::Float64(_) => FeatureType::Float64,
            Column::Float32(_) => FeatureType::Float32,
            Column::Int64(_) => FeatureType::Int64,
            Column::Int32(_) => FeatureType::Int32,
            Column::String(_) => FeatureType::String,
            Column::Boolean(_) => FeatureType::Boolean,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Float64(v) => v.len(),
            Column::Float32(v) => v.len(),
            Column::Int64(v) => v.len(),
            Column::Int32(v) => v.len(),
            Column::String(v) => v.len(),
            Column::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            Column::Float64(v) => v.get(row).map(|x| Value::Float64(*x)),
            Column::Float32(v) => v.get(row).map(|x| Value::Float32(*x)),
            Column::Int64(v) => v.get(row).map(|x| Value::Int64(*x)),
            Column::Int32(v) => v.get(row).map(|x| Value::Int32(*x)),
            Column::String(v) => v.get(row).map(|x| Value::String(x.clone())),
            Column::Boolean(v) => v.get(row).map(|x| Value::Boolean(*x)),
        }
    }

    /// Builds a column of `dtype` from cells that must all be of that type.
    pub fn from_values(dtype: FeatureType, values: Vec<Value>) -> Result<Column, String> {
        let mut column = Column::empty(dtype);
        for value in values {
            column.push(value)?;
        }
        Ok(column)
    }

    pub fn push(&mut self, value: Value) -> Result<(), String> {
        match (self, value) {
            (Column::Float64(v), Value::Float64(x)) => v.push(x),
            (Column::Float32(v), Value::Float32(x)) => v.push(x),
            (Column::Int64(v), Value::Int64(x)) => v.push(x),
            (Column::Int32(v), Value::Int32(x)) => v.push(x),
            (Column::String(v), Value::String(x)) => v.push(x),
            (Column::Boolean(v), Value::Boolean(x)) => v.push(x),
            (column, value) => {
                return Err(format!(
                    "cannot store a {} value in a {} column",
                    value.dtype(),
                    column.dtype()
                ))
            }
        }
        Ok(())
    }

    /// Keeps the rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Column {
        map_column!(self, values => values
            .iter()
            .zip(mask)
            .filter(|(_, keep)| **keep)
            .map(|(x, _)| x.clone())
            .collect())
    }

    /// Numeric view of the column, `None` for string and boolean columns.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Float64(v) => Some(v.clone()),
            Column::Float32(v) => Some(v.iter().map(|x| *x as f64).collect()),
            Column::Int64(v) => Some(v.iter().map(|x| *x as f64).collect()),
            Column::Int32(v) => Some(v.iter().map(|x| *x as f64).collect()),
            Column::String(_) | Column::Boolean(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            Column::Boolean(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(values: Vec<f64>) -> Self {
        Column::Float64(values)
    }
}

impl From<Vec<i64>> for Column {
    fn from(values: Vec<i64>) -> Self {
        Column::Int64(values)
    }
}

impl From<Vec<i32>> for Column {
    fn from(values: Vec<i32>) -> Self {
        Column::Int32(values)
    }
}

impl From<Vec<bool>> for Column {
    fn from(values: Vec<bool>) -> Self {
        Column::Boolean(values)
    }
}
