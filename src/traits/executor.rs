// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::data::EventSet;
use crate::engine::ExecutionPlan;
use crate::errors::ExecutionError;

/// Strategy for walking a resolved schedule.
///
/// Every executor receives a plan whose steps already have their backend
/// executors resolved and whose leaves are bound, and returns the requested
/// outputs in request order. Implementations differ only in how much of the
/// schedule they run concurrently; all of them produce identical results.
#[async_trait]
pub trait ScheduleExecutor: Send + Sync {
    async fn execute(&self, plan: ExecutionPlan) -> Result<Vec<EventSet>, ExecutionError>;

    fn name(&self) -> &'static str;
}
