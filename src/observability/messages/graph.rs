// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph construction.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Operator instance added to a graph.
pub struct OperatorInstantiated<'a> {
    pub key: &'a str,
    pub instance: usize,
    pub input_count: usize,
    pub output_count: usize,
}

impl Display for OperatorInstantiated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Instantiated operator '{}' as instance #{} ({} inputs, {} outputs)",
            self.key, self.instance, self.input_count, self.output_count
        )
    }
}

impl StructuredLog for OperatorInstantiated<'_> {
    fn log(&self) {
        tracing::debug!(
            key = self.key,
            instance = self.instance,
            input_count = self.input_count,
            output_count = self.output_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "operator_instantiated",
            span_name = name,
            key = self.key,
            instance = self.instance,
        )
    }
}

/// Operator instance rejected at construction time.
pub struct OperatorRejected<'a> {
    pub key: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for OperatorRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rejected operator '{}': {}", self.key, self.error)
    }
}

impl StructuredLog for OperatorRejected<'_> {
    fn log(&self) {
        tracing::warn!(key = self.key, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "operator_rejected",
            span_name = name,
            key = self.key,
            error = %self.error,
        )
    }
}
