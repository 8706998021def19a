// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.

use std::fmt::Display;
use tracing::Span;

pub mod engine;
pub mod graph;
pub mod registry;
pub mod validation;

/// A log event with a fixed level and a fixed set of structured fields.
pub trait StructuredLog: Display {
    /// Emit the event at its level.
    fn log(&self);

    /// Open a span carrying the same fields.
    fn span(&self, name: &str) -> Span;
}
