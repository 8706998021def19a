// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::data::EventSet;
use crate::engine::plan::{run_step, ExecutionPlan, ResultStore};
use crate::errors::ExecutionError;
use crate::traits::ScheduleExecutor;

/// Runs the steps one after another on the calling task, in schedule order.
#[derive(Debug, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScheduleExecutor for SequentialExecutor {
    async fn execute(&self, plan: ExecutionPlan) -> Result<Vec<EventSet>, ExecutionError> {
        let mut store = ResultStore::new(&plan);
        for planned in plan.steps() {
            let inputs = store.inputs(&planned.step)?;
            let outputs = run_step(planned, plan.backend(), &inputs)?;
            drop(inputs);
            store.store(&planned.step, outputs);
            store.release_inputs(&planned.step);
        }
        store.into_outputs(plan.requested())
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}
