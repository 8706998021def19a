// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scheduling and evaluation.
//!
//! [`build_schedule`] prunes a graph to what the requested nodes need and
//! orders it. [`ExecutionPlan::resolve`] pairs every step with a backend
//! executor and binds leaf data. A [`ScheduleExecutor`](crate::traits::ScheduleExecutor)
//! strategy then runs the plan:
//!
//! * [`SequentialExecutor`] - one step at a time, in schedule order
//! * [`LevelByLevelExecutor`] - every step of a dependency level concurrently

pub mod factory;
pub mod level_by_level;
pub mod plan;
pub mod schedule;
pub mod sequential;
#[cfg(test)]
pub mod integration_tests;

pub use factory::ExecutorFactory;
pub use level_by_level::LevelByLevelExecutor;
pub use plan::{ExecutionPlan, LeafBindings, PlannedStep, ResultStore};
pub use schedule::{build_schedule, Schedule, ScheduledLeaf, Step};
pub use sequential::SequentialExecutor;
