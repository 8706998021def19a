// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::arithmetic::ArithmeticOp;
use crate::backends::{collect_groups, expect_inputs, expect_output, require_same_sampling, Group};
use crate::data::{Column, EventSet, IndexData};
use crate::errors::ExecutorError;
use crate::operators::{arithmetic_scalar, Attributes};
use crate::schema::Schema;
use crate::traits::OperatorExecutor;

/// Feature-wise arithmetic between two collections on the same sampling.
pub struct BinaryArithmetic(pub ArithmeticOp);

impl OperatorExecutor for BinaryArithmetic {
    fn execute(
        &self,
        inputs: &[&EventSet],
        _attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [left, right] = expect_inputs::<2>(inputs)?;
        let schema = expect_output(outputs)?;
        require_same_sampling(left, right)?;

        let groups = left.iter().zip(right.iter()).map(|((key, l), (_, r))| -> Group {
            let features = l
                .features
                .iter()
                .zip(&r.features)
                .map(|(a, b)| binary_column(self.0, a, b))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((key.clone(), IndexData::new(l.timestamps.clone(), features)))
        });
        Ok(vec![collect_groups(schema, groups)?])
    }

    fn name(&self) -> &'static str {
        "array_binary_arithmetic"
    }
}

/// Arithmetic between every feature and the `value` attribute.
pub struct ScalarArithmetic(pub ArithmeticOp);

impl OperatorExecutor for ScalarArithmetic {
    fn execute(
        &self,
        inputs: &[&EventSet],
        attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [input] = expect_inputs::<1>(inputs)?;
        let schema = expect_output(outputs)?;
        let value = attributes.float(arithmetic_scalar::VALUE).ok_or_else(|| {
            ExecutorError::InvalidInput("missing attribute 'value'".to_string())
        })?;

        let groups = input.iter().map(|(key, data)| -> Group {
            let features = data
                .features
                .iter()
                .map(|column| scalar_column(self.0, column, value))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((key.clone(), IndexData::new(data.timestamps.clone(), features)))
        });
        Ok(vec![collect_groups(schema, groups)?])
    }

    fn name(&self) -> &'static str {
        "array_scalar_arithmetic"
    }
}

fn binary_column(op: ArithmeticOp, left: &Column, right: &Column) -> Result<Column, ExecutorError> {
    match (left, right) {
        (Column::Float64(a), Column::Float64(b)) => Ok(Column::Float64(
            a.iter().zip(b).map(|(x, y)| op.float(*x, *y)).collect(),
        )),
        (Column::Float32(a), Column::Float32(b)) => Ok(Column::Float32(
            a.iter().zip(b).map(|(x, y)| op.float32(*x, *y)).collect(),
        )),
        (Column::Int64(a), Column::Int64(b)) => a
            .iter()
            .zip(b)
            .map(|(x, y)| op.int64(*x, *y))
            .collect::<Result<_, _>>()
            .map(Column::Int64),
        (Column::Int32(a), Column::Int32(b)) => a
            .iter()
            .zip(b)
            .map(|(x, y)| op.int32(*x, *y))
            .collect::<Result<_, _>>()
            .map(Column::Int32),
        (a, b) => Err(ExecutorError::InvalidInput(format!(
            "cannot apply {:?} to {} and {} columns",
            op,
            a.dtype(),
            b.dtype()
        ))),
    }
}

fn scalar_column(op: ArithmeticOp, column: &Column, value: f64) -> Result<Column, ExecutorError> {
    let dtype = column.dtype();
    if dtype.is_integer() && !dtype.holds_exactly(value) {
        return Err(ExecutorError::InvalidInput(format!(
            "scalar {} is not representable as {}",
            value, dtype
        )));
    }
    match column {
        Column::Float64(a) => Ok(Column::Float64(a.iter().map(|x| op.float(*x, value)).collect())),
        Column::Float32(a) => {
            let value = value as f32;
            Ok(Column::Float32(a.iter().map(|x| op.float32(*x, value)).collect()))
        }
        Column::Int64(a) => {
            let value = value as i64;
            a.iter()
                .map(|x| op.int64(*x, value))
                .collect::<Result<_, _>>()
                .map(Column::Int64)
        }
        Column::Int32(a) => {
            let value = value as i32;
            a.iter()
                .map(|x| op.int32(*x, value))
                .collect::<Result<_, _>>()
                .map(Column::Int32)
        }
        other => Err(ExecutorError::InvalidInput(format!(
            "cannot apply a scalar to a {} column",
            other.dtype()
        ))),
    }
}
