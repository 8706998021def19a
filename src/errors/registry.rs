// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by the operator and implementation registries.

use thiserror::Error;

/// Registry misuse and backend binding failures.
///
/// Everything except `BackendNotImplemented` is a setup error: it is raised
/// while the process is registering operators and backends and is never
/// retried. `BackendNotImplemented` is the expected condition a caller may
/// recover from, e.g. by evaluating on another backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("operator '{key}' is already registered")]
    DuplicateKey { key: String },

    #[error("unknown operator '{key}'")]
    UnknownOperator { key: String },

    #[error("unknown backend '{backend}'")]
    UnknownBackend { backend: String },

    #[error("operator '{key}' is not implemented on backend '{backend}'")]
    BackendNotImplemented { key: String, backend: String },

    #[error("operator '{key}' already has an implementation on backend '{backend}'")]
    DuplicateImplementation { key: String, backend: String },
}

impl RegistryError {
    /// True when the caller may fall back to another backend.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RegistryError::BackendNotImplemented { .. })
    }
}
