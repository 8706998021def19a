// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Row-oriented backend.
//!
//! Each executor converts its inputs into [`Frame`]s, works row by row and
//! converts the result back. It covers selection, renaming, filtering and
//! arithmetic; calendar, cast and window operators are not implemented here.

pub mod table;

pub use table::{Frame, Row};

use std::sync::Arc;

use crate::backends::arithmetic::ArithmeticOp;
use crate::backends::{expect_inputs, expect_output, require_same_sampling, ImplementationRegistry};
use crate::data::EventSet;
use crate::errors::{ExecutorError, RegistryError};
use crate::operators::{arithmetic_scalar, filter, rename, select, Attributes};
use crate::schema::Schema;
use crate::traits::{Backend, OperatorExecutor};

pub const FRAME: &str = "frame";

pub struct FrameBackend;

impl Backend for FrameBackend {
    fn name(&self) -> &'static str {
        FRAME
    }

    fn install(&self, registry: &mut ImplementationRegistry) -> Result<(), RegistryError> {
        registry.register_backend(FRAME);

        for op in ArithmeticOp::ALL {
            registry.register(op.key(), FRAME, Arc::new(FrameBinary(op)))?;
            registry.register(op.scalar_key(), FRAME, Arc::new(FrameScalar(op)))?;
        }
        registry.register(select::SELECT, FRAME, Arc::new(FrameSelect))?;
        registry.register(rename::RENAME, FRAME, Arc::new(FrameRename))?;
        registry.register(filter::FILTER, FRAME, Arc::new(FrameFilter))?;
        Ok(())
    }
}

pub struct FrameBinary(pub ArithmeticOp);

impl OperatorExecutor for FrameBinary {
    fn execute(
        &self,
        inputs: &[&EventSet],
        _attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [left, right] = expect_inputs::<2>(inputs)?;
        let schema = expect_output(outputs)?;
        require_same_sampling(left, right)?;

        let mut frame = Frame::from_event_set(left)?;
        let right = Frame::from_event_set(right)?;
        for (row, right_row) in frame.rows.iter_mut().zip(&right.rows) {
            row.values = row
                .values
                .iter()
                .zip(&right_row.values)
                .map(|(a, b)| self.0.values(a, b))
                .collect::<Result<_, _>>()?;
        }
        Ok(vec![frame.into_event_set(schema)?])
    }

    fn name(&self) -> &'static str {
        "frame_binary_arithmetic"
    }
}

pub struct FrameScalar(pub ArithmeticOp);

impl OperatorExecutor for FrameScalar {
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

        let mut frame = Frame::from_event_set(input)?;
        for row in frame.rows.iter_mut() {
            row.values = row
                .values
                .iter()
                .map(|cell| self.0.scalar(cell, value))
                .collect::<Result<_, _>>()?;
        }
        Ok(vec![frame.into_event_set(schema)?])
    }

    fn name(&self) -> &'static str {
        "frame_scalar_arithmetic"
    }
}

pub struct FrameSelect;

impl OperatorExecutor for FrameSelect {
    fn execute(
        &self,
        inputs: &[&EventSet],
        _attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [input] = expect_inputs::<1>(inputs)?;
        let schema = expect_output(outputs)?;
        let positions = schema
            .features
            .iter()
            .map(|f| {
                input.schema().feature_position(&f.name).ok_or_else(|| {
                    ExecutorError::InvalidInput(format!("feature '{}' not found in input", f.name))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut frame = Frame::from_event_set(input)?;
        for row in frame.rows.iter_mut() {
            row.values = positions.iter().map(|p| row.values[*p].clone()).collect();
        }
        Ok(vec![frame.into_event_set(schema)?])
    }

    fn name(&self) -> &'static str {
        "frame_select"
    }
}

pub struct FrameRename;

impl OperatorExecutor for FrameRename {
    fn execute(
        &self,
        inputs: &[&EventSet],
        _attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [input] = expect_inputs::<1>(inputs)?;
        let schema = expect_output(outputs)?;
        Ok(vec![Frame::from_event_set(input)?.into_event_set(schema)?])
    }

    fn name(&self) -> &'static str {
        "frame_rename"
    }
}

pub struct FrameFilter;

impl OperatorExecutor for FrameFilter {
    fn execute(
        &self,
        inputs: &[&EventSet],
        _attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [input, condition] = expect_inputs::<2>(inputs)?;
        let schema = expect_output(outputs)?;
        require_same_sampling(input, condition)?;

        let mask = Frame::from_event_set(condition)?
            .rows
            .into_iter()
            .map(|row| match row.values.as_slice() {
                [cell] => cell.as_bool().ok_or_else(|| {
                    ExecutorError::InvalidInput("condition must be boolean".to_string())
                }),
                _ => Err(ExecutorError::InvalidInput(
                    "condition must be a single feature".to_string(),
                )),
            })
            .collect::<Result<Vec<bool>, _>>()?;

        let mut frame = Frame::from_event_set(input)?;
        let mut keep = mask.into_iter();
        frame.rows.retain(|_| keep.next().unwrap_or(false));
        Ok(vec![frame.into_event_set(schema)?])
    }

    fn name(&self) -> &'static str {
        "frame_filter"
    }
}
