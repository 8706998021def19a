// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline file validation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic reference detected in a pipeline file.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_tempograph::observability::messages::validation::CyclicDependencyDetected;
///
/// let cycle = vec!["ratio", "scaled", "ratio"];
/// let msg = CyclicDependencyDetected {
///     cycle: &cycle,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CyclicDependencyDetected<'a> {
    pub cycle: &'a [&'a str],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "cyclic_dependency",
            span_name = name,
            cycle = self.cycle.join(" -> "),
        )
    }
}

/// Reference to an id no leaf or operator declares.
pub struct UnresolvedReference<'a> {
    pub node_id: &'a str,
    pub reference: &'a str,
}

impl Display for UnresolvedReference<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "'{}' references missing node '{}'",
            self.node_id, self.reference
        )
    }
}

impl StructuredLog for UnresolvedReference<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            reference = self.reference,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unresolved_reference",
            span_name = name,
            node_id = self.node_id,
            reference = self.reference,
        )
    }
}

/// Two leaves or operators share an id.
pub struct DuplicateId<'a> {
    pub id: &'a str,
}

impl Display for DuplicateId<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate id: '{}'", self.id)
    }
}

impl StructuredLog for DuplicateId<'_> {
    fn log(&self) {
        tracing::error!(id = self.id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("duplicate_id", span_name = name, id = self.id)
    }
}

/// An id is empty or contains the `.` slot separator.
pub struct InvalidId<'a> {
    pub id: &'a str,
}

impl Display for InvalidId<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Invalid id: '{}'", self.id)
    }
}

impl StructuredLog for InvalidId<'_> {
    fn log(&self) {
        tracing::error!(id = self.id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("invalid_id", span_name = name, id = self.id)
    }
}
