// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for scheduling and evaluation.
//!
//! This module contains message types for logging events related to:
//! * Schedule construction and level decomposition
//! * Evaluation lifecycle (start, completion, failure)
//! * Per-step execution and release of intermediate results
//! * Caller-requested fallback to another backend

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Schedule computed for a set of requested nodes.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ScheduleBuilt {
    pub requested_count: usize,
    pub step_count: usize,
    pub graph_instance_count: usize,
}

impl Display for ScheduleBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scheduled {} of {} operator instances for {} requested nodes",
            self.step_count, self.graph_instance_count, self.requested_count
        )
    }
}

impl StructuredLog for ScheduleBuilt {
    fn log(&self) {
        tracing::debug!(
            requested_count = self.requested_count,
            step_count = self.step_count,
            graph_instance_count = self.graph_instance_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "schedule_built",
            span_name = name,
            step_count = self.step_count,
        )
    }
}

/// Topological sort failed (cycle in the instance graph).
///
/// # Log Level
/// `error!` - Internal consistency failure
///
/// # Example
/// ```
/// use the_tempograph::observability::messages::engine::TopologicalSortFailed;
///
/// let msg = TopologicalSortFailed {
///     unscheduled_count: 2,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct TopologicalSortFailed {
    pub unscheduled_count: usize,
}

impl Display for TopologicalSortFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Topological sort failed: {} operator instances form a cycle",
            self.unscheduled_count
        )
    }
}

impl StructuredLog for TopologicalSortFailed {
    fn log(&self) {
        tracing::error!(unscheduled_count = self.unscheduled_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "topological_sort_failed",
            span_name = name,
            unscheduled_count = self.unscheduled_count,
        )
    }
}

/// Level decomposition computed for the level-by-level strategy.
pub struct LevelComputationCompleted {
    pub level_count: usize,
    pub step_count: usize,
}

impl Display for LevelComputationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Computed {} levels for {} scheduled steps",
            self.level_count, self.step_count
        )
    }
}

impl StructuredLog for LevelComputationCompleted {
    fn log(&self) {
        tracing::debug!(
            level_count = self.level_count,
            step_count = self.step_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "level_computation",
            span_name = name,
            level_count = self.level_count,
            step_count = self.step_count,
        )
    }
}

/// Evaluation started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EvaluationStarted<'a> {
    pub strategy: &'a str,
    pub backend: &'a str,
    pub step_count: usize,
}

impl Display for EvaluationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting evaluation on backend '{}' with {} strategy: {} steps",
            self.backend, self.strategy, self.step_count
        )
    }
}

impl StructuredLog for EvaluationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            backend = self.backend,
            step_count = self.step_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluation",
            span_name = name,
            strategy = self.strategy,
            backend = self.backend,
            step_count = self.step_count,
        )
    }
}

/// Evaluation completed and every requested output was produced.
///
/// # Example
/// ```
/// use the_tempograph::observability::messages::engine::EvaluationCompleted;
/// use std::time::Duration;
///
/// let msg = EvaluationCompleted {
///     strategy: "level",
///     backend: "array",
///     output_count: 2,
///     duration: Duration::from_millis(12),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct EvaluationCompleted<'a> {
    pub strategy: &'a str,
    pub backend: &'a str,
    pub output_count: usize,
    pub duration: std::time::Duration,
}

impl Display for EvaluationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluation on backend '{}' completed with {} strategy: {} outputs in {:?}",
            self.backend, self.strategy, self.output_count, self.duration
        )
    }
}

impl StructuredLog for EvaluationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            backend = self.backend,
            output_count = self.output_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluation_completed",
            span_name = name,
            strategy = self.strategy,
            backend = self.backend,
            duration = ?self.duration,
        )
    }
}

/// Evaluation aborted; no output is returned.
pub struct EvaluationFailed<'a> {
    pub strategy: &'a str,
    pub backend: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for EvaluationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluation on backend '{}' failed with {} strategy: {}",
            self.backend, self.strategy, self.error
        )
    }
}

impl StructuredLog for EvaluationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            strategy = self.strategy,
            backend = self.backend,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "evaluation_failed",
            span_name = name,
            strategy = self.strategy,
            backend = self.backend,
            error = %self.error,
        )
    }
}

/// One scheduled operator instance finished.
pub struct StepCompleted<'a> {
    pub key: &'a str,
    pub instance: usize,
    pub backend: &'a str,
    pub executor: &'a str,
    pub output_events: usize,
    pub duration: std::time::Duration,
}

impl Display for StepCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Step '{}' (instance #{}) ran on '{}' via {}: {} events in {:?}",
            self.key, self.instance, self.backend, self.executor, self.output_events, self.duration
        )
    }
}

impl StructuredLog for StepCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            key = self.key,
            instance = self.instance,
            backend = self.backend,
            executor = self.executor,
            output_events = self.output_events,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "step",
            span_name = name,
            key = self.key,
            instance = self.instance,
            backend = self.backend,
        )
    }
}

/// Intermediate result dropped after its last consumer ran.
pub struct IntermediateReleased {
    pub node: usize,
    pub live_count: usize,
}

impl Display for IntermediateReleased {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Released intermediate node #{} ({} results still live)",
            self.node, self.live_count
        )
    }
}

impl StructuredLog for IntermediateReleased {
    fn log(&self) {
        tracing::trace!(node = self.node, live_count = self.live_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("intermediate_released", span_name = name, node = self.node)
    }
}

/// Caller asked to retry on the next backend after a missing implementation.
pub struct BackendFallback<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub reason: &'a dyn std::error::Error,
}

impl Display for BackendFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Falling back from backend '{}' to '{}': {}",
            self.from, self.to, self.reason
        )
    }
}

impl StructuredLog for BackendFallback<'_> {
    fn log(&self) {
        tracing::warn!(
            from = self.from,
            to = self.to,
            reason = %self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "backend_fallback",
            span_name = name,
            from = self.from,
            to = self.to,
        )
    }
}
