// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Backend executors for the built-in operators.
//!
//! A backend is a named family of [`OperatorExecutor`]s registered in the
//! [`ImplementationRegistry`]. The same graph evaluates on any backend that
//! implements every scheduled operator and yields identical results.
//!
//! # Available Backends
//!
//! ## Array Backend (`array`)
//! Column-wise kernels over typed vectors. Implements every built-in operator.
//!
//! ## Frame Backend (`frame`)
//! Converts collections to a row table, runs row-wise kernels and converts
//! back. Implements selection, renaming, filtering and arithmetic; other
//! operators fail with [`RegistryError::BackendNotImplemented`].
//!
//! ## Accelerated Backend (`accelerated`)
//! Reserved name without implementations.
//!
//! # Examples
//!
//! ```rust
//! use the_tempograph::backends::ImplementationRegistry;
//! use the_tempograph::operators::OperatorRegistry;
//!
//! let operators = OperatorRegistry::with_builtins().unwrap().freeze();
//! let implementations = ImplementationRegistry::with_builtins(operators).unwrap();
//!
//! assert!(implementations.resolve("CAST", "array").is_ok());
//! assert!(implementations
//!     .resolve("CAST", "frame")
//!     .err()
//!     .unwrap()
//!     .is_recoverable());
//! ```
//!
//! [`OperatorExecutor`]: crate::traits::OperatorExecutor

pub mod accelerated;
pub mod arithmetic;
pub mod array;
pub mod frame;
pub mod registry;

pub use registry::ImplementationRegistry;

use crate::data::{EventSet, IndexData, IndexKey};
use crate::errors::{ExecutorError, RegistryError};
use crate::schema::Schema;
use crate::traits::Backend;

/// Installs `array`, `frame` and `accelerated`.
pub fn install_builtins(registry: &mut ImplementationRegistry) -> Result<(), RegistryError> {
    let backends: [&dyn Backend; 3] = [
        &array::ArrayBackend,
        &frame::FrameBackend,
        &accelerated::AcceleratedBackend,
    ];
    for backend in backends {
        backend.install(registry)?;
    }
    Ok(())
}

/// Fails unless both collections have the same keys and, per key, the same
/// timestamps.
pub(crate) fn require_same_sampling(left: &EventSet, right: &EventSet) -> Result<(), ExecutorError> {
    if left.len() != right.len() || left.keys().ne(right.keys()) {
        return Err(ExecutorError::InvalidInput(
            "inputs do not have the same index keys".to_string(),
        ));
    }
    for ((key, l), (_, r)) in left.iter().zip(right.iter()) {
        if l.timestamps != r.timestamps {
            return Err(ExecutorError::InvalidInput(format!(
                "inputs do not have the same timestamps for index key {}",
                key
            )));
        }
    }
    Ok(())
}

/// Checks an executor received the number of inputs its operator declares.
pub(crate) fn expect_inputs<'a, const N: usize>(
    inputs: &[&'a EventSet],
) -> Result<[&'a EventSet; N], ExecutorError> {
    inputs.try_into().map_err(|_| {
        ExecutorError::InvalidInput(format!("expected {} inputs, got {}", N, inputs.len()))
    })
}

pub(crate) fn expect_output(outputs: &[Schema]) -> Result<&Schema, ExecutorError> {
    match outputs {
        [schema] => Ok(schema),
        _ => Err(ExecutorError::InvalidInput(format!(
            "expected one output schema, got {}",
            outputs.len()
        ))),
    }
}

/// Result of a kernel for one index key.
pub(crate) type Group = Result<(IndexKey, IndexData), ExecutorError>;

/// Builds a collection from per-key results.
pub(crate) fn collect_groups(
    schema: &Schema,
    groups: impl IntoIterator<Item = Group>,
) -> Result<EventSet, ExecutorError> {
    let mut output = EventSet::new(schema.clone());
    for group in groups {
        let (key, data) = group?;
        output.insert(key, data);
    }
    Ok(output)
}
