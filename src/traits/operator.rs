// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::data::EventSet;
use crate::errors::ExecutorError;
use crate::operators::Attributes;
use crate::schema::Schema;

/// Backend kernel for one operator key.
///
/// Executors are stateless and shared across evaluations. They receive the
/// computed inputs in slot order, the instance's validated attributes and the
/// schemas the graph declared for each output, and must return exactly one
/// collection per output schema.
pub trait OperatorExecutor: Send + Sync {
    fn execute(
        &self,
        inputs: &[&EventSet],
        attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError>;

    fn name(&self) -> &'static str;
}
