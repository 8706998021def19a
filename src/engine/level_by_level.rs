// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::data::EventSet;
use crate::engine::plan::{run_step, ExecutionPlan, PlannedStep, ResultStore};
use crate::errors::ExecutionError;
use crate::observability::messages::engine::LevelComputationCompleted;
use crate::observability::messages::StructuredLog;
use crate::traits::ScheduleExecutor;

/// Level-by-level executor running independent steps concurrently.
///
/// The schedule is split into levels where every step only reads leaves or
/// outputs of earlier levels. All steps of a level run concurrently on
/// blocking worker threads, since kernels are CPU bound, and the level is
/// joined before the next one starts.
///
/// ## Execution Strategy
///
/// 1. **Level Decomposition**: taken from the schedule (dependency depth of each step)
/// 2. **Fork**: each step of the level acquires a semaphore permit and runs on
///    `spawn_blocking`, so at most `max_concurrency` kernels run at once
/// 3. **Join**: results are collected in schedule order; the first failing step
///    in that order aborts the evaluation
/// 4. **Release**: inputs whose consumers have all run are dropped
///
/// Results are identical to [`crate::engine::SequentialExecutor`]: steps of one
/// level never read each other's outputs and results are stored in schedule
/// order.
pub struct LevelByLevelExecutor {
    /// Maximum number of steps running at the same time within a level
    max_concurrency: usize,
}

impl LevelByLevelExecutor {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Executor with one permit per available CPU core.
    pub fn with_available_parallelism() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(concurrency)
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    async fn execute_level(
        &self,
        level: &[usize],
        plan: &ExecutionPlan,
        store: &ResultStore,
        semaphore: &Arc<Semaphore>,
    ) -> Result<Vec<(Arc<PlannedStep>, Vec<EventSet>)>, ExecutionError> {
        let mut tasks = Vec::with_capacity(level.len());

        for position in level {
            let planned = plan.steps().get(*position).cloned().ok_or_else(|| {
                ExecutionError::InternalError {
                    message: format!("level references missing step {}", position),
                }
            })?;
            let inputs = store.inputs(&planned.step)?;
            let backend = plan.backend().to_string();

            let permit = semaphore.clone().acquire_owned().await.map_err(|e| {
                ExecutionError::InternalError {
                    message: format!(
                        "Failed to acquire semaphore permit for '{}': {}",
                        planned.step.key(),
                        e
                    ),
                }
            })?;

            let task_step = planned.clone();
            let task = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                run_step(&task_step, &backend, &inputs)
            });
            tasks.push((planned, task));
        }

        let mut completed = Vec::with_capacity(tasks.len());
        for (planned, task) in tasks {
            match task.await {
                Ok(Ok(outputs)) => completed.push((planned, outputs)),
                Ok(Err(e)) => return Err(e),
                Err(join_error) => {
                    return Err(ExecutionError::InternalError {
                        message: format!("Task join error: {}", join_error),
                    })
                }
            }
        }
        Ok(completed)
    }
}

#[async_trait]
impl ScheduleExecutor for LevelByLevelExecutor {
    async fn execute(&self, plan: ExecutionPlan) -> Result<Vec<EventSet>, ExecutionError> {
        LevelComputationCompleted {
            level_count: plan.levels().len(),
            step_count: plan.steps().len(),
        }
        .log();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut store = ResultStore::new(&plan);

        for level in plan.levels() {
            let completed = self.execute_level(level, &plan, &store, &semaphore).await?;
            let mut finished = Vec::with_capacity(completed.len());
            for (planned, outputs) in completed {
                store.store(&planned.step, outputs);
                finished.push(planned);
            }
            for planned in &finished {
                store.release_inputs(&planned.step);
            }
        }

        store.into_outputs(plan.requested())
    }

    fn name(&self) -> &'static str {
        "level"
    }
}
