// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::backends::ImplementationRegistry;
use crate::config::Config;
use crate::data::EventSet;
use crate::engine::factory::ExecutorFactory;
use crate::engine::{build_schedule, ExecutionPlan, LeafBindings};
use crate::errors::{ConfigError, ExecutionError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::observability::messages::engine::{
    BackendFallback, EvaluationCompleted, EvaluationFailed, EvaluationStarted,
};
use crate::observability::messages::StructuredLog;
use crate::operators::OperatorRegistry;
use crate::traits::ScheduleExecutor;

/// Frozen registries plus the strategy that runs evaluations.
///
/// A `Runtime` is built once at startup and shared; evaluating never mutates
/// it, so concurrent evaluations over different graphs are safe.
pub struct Runtime {
    implementations: Arc<ImplementationRegistry>,
    executor: Box<dyn ScheduleExecutor>,
}

impl Runtime {
    pub fn new(implementations: Arc<ImplementationRegistry>, executor: Box<dyn ScheduleExecutor>) -> Self {
        Self {
            implementations,
            executor,
        }
    }

    pub fn operators(&self) -> &Arc<OperatorRegistry> {
        self.implementations.operators()
    }

    pub fn implementations(&self) -> &Arc<ImplementationRegistry> {
        &self.implementations
    }

    pub fn strategy(&self) -> &'static str {
        self.executor.name()
    }

    /// Evaluates `outputs` of `graph` on `backend`.
    ///
    /// Every operator the outputs need must be implemented on `backend`;
    /// that is checked before any operator runs. Results come back in the
    /// order of `outputs`. On any failure nothing is returned.
    pub async fn evaluate(
        &self,
        graph: &Graph,
        outputs: &[NodeId],
        backend: &str,
        bindings: &LeafBindings,
    ) -> Result<Vec<EventSet>, ExecutionError> {
        let strategy = self.executor.name();
        let started = Instant::now();

        let result = self.plan_and_run(graph, outputs, backend, bindings).await;
        match &result {
            Ok(results) => EvaluationCompleted {
                strategy,
                backend,
                output_count: results.len(),
                duration: started.elapsed(),
            }
            .log(),
            Err(error) => EvaluationFailed {
                strategy,
                backend,
                error,
            }
            .log(),
        }
        result
    }

    async fn plan_and_run(
        &self,
        graph: &Graph,
        outputs: &[NodeId],
        backend: &str,
        bindings: &LeafBindings,
    ) -> Result<Vec<EventSet>, ExecutionError> {
        let schedule = build_schedule(graph, outputs)?;
        let plan = ExecutionPlan::resolve(&schedule, &self.implementations, backend, bindings)?;

        let started = EvaluationStarted {
            strategy: self.executor.name(),
            backend,
            step_count: schedule.len(),
        };
        started.log();
        let span = started.span("evaluate");

        self.executor.execute(plan).instrument(span).await
    }

    /// Evaluates on `preferred`, moving on to each of `fallbacks` in turn
    /// only when an operator has no implementation on the current backend.
    /// Any other failure is returned as is. Returns the backend that
    /// produced the results.
    pub async fn evaluate_with_fallback(
        &self,
        graph: &Graph,
        outputs: &[NodeId],
        preferred: &str,
        fallbacks: &[&str],
        bindings: &LeafBindings,
    ) -> Result<(String, Vec<EventSet>), ExecutionError> {
        let mut backend = preferred;
        let mut remaining = fallbacks.iter();

        loop {
            match self.evaluate(graph, outputs, backend, bindings).await {
                Ok(results) => return Ok((backend.to_string(), results)),
                Err(error) if error.is_backend_not_implemented() => match remaining.next() {
                    Some(next) => {
                        BackendFallback {
                            from: backend,
                            to: next,
                            reason: &error,
                        }
                        .log();
                        backend = *next;
                    }
                    None => return Err(error),
                },
                Err(error) => return Err(error),
            }
        }
    }
}

/// Runtime builder - creates the registries and the executor from a pipeline file.
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build the builtin registries, freeze them and pair them with the
    /// executor for `cfg.strategy`. Every backend the file names must exist.
    pub fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        let implementations = Self::builtin_registries()?;

        if let Some(unknown) = cfg
            .backend_order()
            .into_iter()
            .find(|backend| !implementations.has_backend(backend))
        {
            return Err(ConfigError::Registry(RegistryError::UnknownBackend {
                backend: unknown.to_string(),
            }));
        }

        Ok(Runtime::new(implementations, ExecutorFactory::from_config(cfg)))
    }

    /// Builtin operators and every builtin backend, frozen.
    pub fn builtin_registries() -> Result<Arc<ImplementationRegistry>, RegistryError> {
        let operators = OperatorRegistry::with_builtins()?.freeze();
        Ok(ImplementationRegistry::with_builtins(operators)?.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::accelerated::ACCELERATED;
    use crate::backends::array::ARRAY;
    use crate::config::Strategy;
    use crate::engine::SequentialExecutor;

    fn config(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_from_config_picks_strategy() {
        let runtime = RuntimeBuilder::from_config(&config("strategy: level\noutputs: []\n")).unwrap();
        assert_eq!(runtime.strategy(), "level");
        assert!(runtime.implementations().has_backend(ARRAY));
        assert!(runtime.operators().contains("MOVING_SUM"));
    }

    #[test]
    fn test_from_config_rejects_unknown_backend() {
        let cfg = config("backend: gpu\noutputs: []\n");
        assert!(matches!(
            RuntimeBuilder::from_config(&cfg),
            Err(ConfigError::Registry(RegistryError::UnknownBackend { ref backend })) if backend == "gpu"
        ));

        let cfg = config("fallback_backends: [array, tpu]\noutputs: []\n");
        assert!(RuntimeBuilder::from_config(&cfg).is_err());
    }

    #[tokio::test]
    async fn test_empty_request_evaluates_to_nothing() {
        let implementations = RuntimeBuilder::builtin_registries().unwrap();
        let runtime = Runtime::new(Arc::clone(&implementations), Box::new(SequentialExecutor::new()));
        let graph = Graph::new(Arc::clone(runtime.operators()));

        let results = runtime
            .evaluate(&graph, &[], ACCELERATED, &LeafBindings::new())
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(Strategy::Sequential.as_str(), runtime.strategy());
    }
}
