// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::{EventSetError, RegistryError, ScheduleError};

/// Failure reported by a backend executor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutorError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Data(#[from] EventSetError),
}

/// Errors that can occur while evaluating a graph.
///
/// Evaluation is all-or-nothing: any of these aborts the run and no output
/// is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("no data bound to leaf '{leaf}'")]
    MissingLeafBinding { leaf: String },

    #[error("data bound to leaf '{leaf}' is invalid: {reason}")]
    InvalidLeafData { leaf: String, reason: String },

    #[error("operator '{operator}' failed on backend '{backend}': {source}")]
    ExecutorFailed {
        operator: String,
        backend: String,
        #[source]
        source: ExecutorError,
    },

    #[error("operator '{operator}' broke its output contract: {message}")]
    OutputContract { operator: String, message: String },

    #[error("internal execution error: {message}")]
    InternalError { message: String },
}

impl ExecutionError {
    /// True when the backend lacks an implementation for one of the scheduled operators.
    pub fn is_backend_not_implemented(&self) -> bool {
        matches!(
            self,
            ExecutionError::Registry(RegistryError::BackendNotImplemented { .. })
        )
    }
}
