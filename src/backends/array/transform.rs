// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Kernels that reshape collections without computing new values.

use crate::backends::{collect_groups, expect_inputs, expect_output, require_same_sampling, Group};
use crate::data::{Column, EventSet, IndexData};
use crate::errors::ExecutorError;
use crate::operators::{cast, Attributes};
use crate::schema::{FeatureType, Schema};
use crate::traits::OperatorExecutor;

/// Positions of the output features within the input.
fn positions(input: &Schema, output: &Schema) -> Result<Vec<usize>, ExecutorError> {
    output
        .features
        .iter()
        .map(|f| {
            input.feature_position(&f.name).ok_or_else(|| {
                ExecutorError::InvalidInput(format!("feature '{}' not found in input", f.name))
            })
        })
        .collect()
}

pub struct Select;

impl OperatorExecutor for Select {
    fn execute(
        &self,
        inputs: &[&EventSet],
        _attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [input] = expect_inputs::<1>(inputs)?;
        let schema = expect_output(outputs)?;
        let positions = positions(input.schema(), schema)?;

        let groups = input.iter().map(|(key, data)| -> Group {
            let features = positions.iter().map(|p| data.features[*p].clone()).collect();
            Ok((key.clone(), IndexData::new(data.timestamps.clone(), features)))
        });
        Ok(vec![collect_groups(schema, groups)?])
    }

    fn name(&self) -> &'static str {
        "array_select"
    }
}

/// Renaming only touches the schema; the data is shared as-is.
pub struct Rename;

impl OperatorExecutor for Rename {
    fn execute(
        &self,
        inputs: &[&EventSet],
        _attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [input] = expect_inputs::<1>(inputs)?;
        let schema = expect_output(outputs)?;
        Ok(vec![input.clone().with_schema(schema.clone())])
    }

    fn name(&self) -> &'static str {
        "array_rename"
    }
}

pub struct Filter;

impl OperatorExecutor for Filter {
    fn execute(
        &self,
        inputs: &[&EventSet],
        _attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [input, condition] = expect_inputs::<2>(inputs)?;
        let schema = expect_output(outputs)?;
        require_same_sampling(input, condition)?;

        let groups = input.iter().zip(condition.iter()).map(|((key, data), (_, cond))| -> Group {
            let mask = cond
                .features
                .first()
                .and_then(Column::as_bool)
                .ok_or_else(|| {
                    ExecutorError::InvalidInput("condition must be a single boolean feature".to_string())
                })?;
            let timestamps = data
                .timestamps
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(t, _)| *t)
                .collect();
            let features = data.features.iter().map(|c| c.filter(mask)).collect();
            Ok((key.clone(), IndexData::new(timestamps, features)))
        });
        Ok(vec![collect_groups(schema, groups)?])
    }

    fn name(&self) -> &'static str {
        "array_filter"
    }
}

pub struct Cast;

impl OperatorExecutor for Cast {
    fn execute(
        &self,
        inputs: &[&EventSet],
        attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [input] = expect_inputs::<1>(inputs)?;
        let schema = expect_output(outputs)?;
        let target = cast::target_dtype(attributes).ok_or_else(|| {
            ExecutorError::InvalidInput("attribute 'dtype' does not name a feature type".to_string())
        })?;

        let groups = input.iter().map(|(key, data)| -> Group {
            let features = data
                .features
                .iter()
                .map(|c| cast_column(c, target))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((key.clone(), IndexData::new(data.timestamps.clone(), features)))
        });
        Ok(vec![collect_groups(schema, groups)?])
    }

    fn name(&self) -> &'static str {
        "array_cast"
    }
}

/// Float to integer casts truncate toward zero and saturate; booleans map to 0 and 1
/// and any non-zero number is true.
pub fn cast_column(column: &Column, target: FeatureType) -> Result<Column, ExecutorError> {
    if column.dtype() == target {
        return Ok(column.clone());
    }
    if !cast::can_cast(column.dtype(), target) {
        return Err(ExecutorError::InvalidInput(format!(
            "cannot cast a {} column to {}",
            column.dtype(),
            target
        )));
    }

    let values: Vec<f64> = match column {
        Column::Boolean(v) => v.iter().map(|b| if *b { 1.0 } else { 0.0 }).collect(),
        // Integer widening is exact; narrowing wraps like integer arithmetic.
        Column::Int64(v) if target == FeatureType::Int32 => {
            return Ok(Column::Int32(v.iter().map(|x| *x as i32).collect()))
        }
        Column::Int32(v) if target == FeatureType::Int64 => {
            return Ok(Column::Int64(v.iter().map(|x| *x as i64).collect()))
        }
        other => other.to_f64().ok_or_else(|| {
            ExecutorError::InvalidInput(format!("cannot cast a {} column", other.dtype()))
        })?,
    };

    let converted = match target {
        FeatureType::Float64 => Column::Float64(values),
        FeatureType::Float32 => Column::Float32(values.iter().map(|x| *x as f32).collect()),
        FeatureType::Int64 => Column::Int64(values.iter().map(|x| *x as i64).collect()),
        FeatureType::Int32 => Column::Int32(values.iter().map(|x| *x as i32).collect()),
        FeatureType::Boolean => Column::Boolean(values.iter().map(|x| *x != 0.0).collect()),
        FeatureType::String => {
            return Err(ExecutorError::InvalidInput(format!(
                "cannot cast a {} column to string",
                column.dtype()
            )))
        }
    };
    Ok(converted)
}
