// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Arithmetic shared by the column-wise and row-wise backends, so both
//! produce bit-identical results.

use crate::data::Value;
use crate::errors::ExecutorError;
use crate::operators::{arithmetic, arithmetic_scalar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 4] = [
        ArithmeticOp::Add,
        ArithmeticOp::Sub,
        ArithmeticOp::Mul,
        ArithmeticOp::Div,
    ];

    /// Key of the feature-wise operator.
    pub fn key(self) -> &'static str {
        match self {
            ArithmeticOp::Add => arithmetic::ADDITION,
            ArithmeticOp::Sub => arithmetic::SUBTRACTION,
            ArithmeticOp::Mul => arithmetic::MULTIPLICATION,
            ArithmeticOp::Div => arithmetic::DIVISION,
        }
    }

    /// Key of the scalar operator.
    pub fn scalar_key(self) -> &'static str {
        match self {
            ArithmeticOp::Add => arithmetic_scalar::ADDITION_SCALAR,
            ArithmeticOp::Sub => arithmetic_scalar::SUBTRACTION_SCALAR,
            ArithmeticOp::Mul => arithmetic_scalar::MULTIPLICATION_SCALAR,
            ArithmeticOp::Div => arithmetic_scalar::DIVISION_SCALAR,
        }
    }

    pub fn float(self, a: f64, b: f64) -> f64 {
        match self {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Sub => a - b,
            ArithmeticOp::Mul => a * b,
            ArithmeticOp::Div => a / b,
        }
    }

    pub fn float32(self, a: f32, b: f32) -> f32 {
        match self {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Sub => a - b,
            ArithmeticOp::Mul => a * b,
            ArithmeticOp::Div => a / b,
        }
    }

    /// Integer arithmetic wraps on overflow.
    pub fn int64(self, a: i64, b: i64) -> Result<i64, ExecutorError> {
        match self {
            ArithmeticOp::Add => Ok(a.wrapping_add(b)),
            ArithmeticOp::Sub => Ok(a.wrapping_sub(b)),
            ArithmeticOp::Mul => Ok(a.wrapping_mul(b)),
            ArithmeticOp::Div => a.checked_div(b).ok_or_else(division_by_zero),
        }
    }

    pub fn int32(self, a: i32, b: i32) -> Result<i32, ExecutorError> {
        match self {
            ArithmeticOp::Add => Ok(a.wrapping_add(b)),
            ArithmeticOp::Sub => Ok(a.wrapping_sub(b)),
            ArithmeticOp::Mul => Ok(a.wrapping_mul(b)),
            ArithmeticOp::Div => a.checked_div(b).ok_or_else(division_by_zero),
        }
    }

    /// Applies the operation to two cells of the same type.
    pub fn values(self, a: &Value, b: &Value) -> Result<Value, ExecutorError> {
        match (a, b) {
            (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(self.float(*a, *b))),
            (Value::Float32(a), Value::Float32(b)) => Ok(Value::Float32(self.float32(*a, *b))),
            (Value::Int64(a), Value::Int64(b)) => self.int64(*a, *b).map(Value::Int64),
            (Value::Int32(a), Value::Int32(b)) => self.int32(*a, *b).map(Value::Int32),
            (a, b) => Err(ExecutorError::InvalidInput(format!(
                "cannot apply {:?} to {} and {}",
                self,
                a.dtype(),
                b.dtype()
            ))),
        }
    }

    /// Applies the operation between a cell and a scalar converted to the
    /// cell's type.
    pub fn scalar(self, a: &Value, scalar: f64) -> Result<Value, ExecutorError> {
        self.values(a, &scalar_as(a, scalar)?)
    }
}

/// `scalar` as a cell of the same type as `like`. Integer cells reject
/// values the integer type cannot hold exactly.
pub fn scalar_as(like: &Value, scalar: f64) -> Result<Value, ExecutorError> {
    let dtype = like.dtype();
    if dtype.is_integer() && !dtype.holds_exactly(scalar) {
        return Err(ExecutorError::InvalidInput(format!(
            "scalar {} is not representable as {}",
            scalar, dtype
        )));
    }
    match like {
        Value::Float64(_) => Ok(Value::Float64(scalar)),
        Value::Float32(_) => Ok(Value::Float32(scalar as f32)),
        Value::Int64(_) => Ok(Value::Int64(scalar as i64)),
        Value::Int32(_) => Ok(Value::Int32(scalar as i32)),
        other => Err(ExecutorError::InvalidInput(format!(
            "cannot apply a scalar to a {} feature",
            other.dtype()
        ))),
    }
}

fn division_by_zero() -> ExecutorError {
    ExecutorError::InvalidInput("integer division by zero".to_string())
}
