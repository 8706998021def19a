// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for operator and backend registration.
//!
//! Registration happens once at startup, so everything here logs at `debug!`
//! except the summary emitted when the registries are frozen.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Operator definition added to the operator registry.
pub struct OperatorRegistered<'a> {
    pub key: &'a str,
    pub input_count: usize,
    pub output_count: usize,
    pub attribute_count: usize,
}

impl Display for OperatorRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered operator '{}': {} inputs, {} outputs, {} attributes",
            self.key, self.input_count, self.output_count, self.attribute_count
        )
    }
}

impl StructuredLog for OperatorRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            key = self.key,
            input_count = self.input_count,
            output_count = self.output_count,
            attribute_count = self.attribute_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "operator_registered",
            span_name = name,
            key = self.key,
        )
    }
}

/// Backend name reserved in the implementation registry.
pub struct BackendReserved<'a> {
    pub backend: &'a str,
}

impl Display for BackendReserved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reserved backend '{}'", self.backend)
    }
}

impl StructuredLog for BackendReserved<'_> {
    fn log(&self) {
        tracing::debug!(backend = self.backend, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("backend_reserved", span_name = name, backend = self.backend)
    }
}

/// Executor bound to an (operator, backend) pair.
pub struct ImplementationRegistered<'a> {
    pub key: &'a str,
    pub backend: &'a str,
    pub executor: &'a str,
}

impl Display for ImplementationRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered '{}' implementation of '{}' on backend '{}'",
            self.executor, self.key, self.backend
        )
    }
}

impl StructuredLog for ImplementationRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            key = self.key,
            backend = self.backend,
            executor = self.executor,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "implementation_registered",
            span_name = name,
            key = self.key,
            backend = self.backend,
        )
    }
}

/// Registries populated; no further registration can happen.
///
/// # Example
/// ```
/// use the_tempograph::observability::messages::registry::RegistriesFrozen;
///
/// let msg = RegistriesFrozen {
///     operator_count: 20,
///     backend_count: 3,
///     implementation_count: 31,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RegistriesFrozen {
    pub operator_count: usize,
    pub backend_count: usize,
    pub implementation_count: usize,
}

impl Display for RegistriesFrozen {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Startup complete: {} operators, {} backends, {} implementations",
            self.operator_count, self.backend_count, self.implementation_count
        )
    }
}

impl StructuredLog for RegistriesFrozen {
    fn log(&self) {
        tracing::info!(
            operator_count = self.operator_count,
            backend_count = self.backend_count,
            implementation_count = self.implementation_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "registries_frozen",
            span_name = name,
            operator_count = self.operator_count,
            backend_count = self.backend_count,
        )
    }
}
