// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use crate::config::{
        load_and_validate_config, load_leaf_bindings, Config, PipelineBuilder, RuntimeBuilder,
        Strategy,
    };
    use crate::data::{Column, EventSet, IndexKey, IndexValue};
    use crate::errors::{ConfigError, ValidationError};

    fn pipeline_file(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("pipelines").join(name)
    }

    fn store(name: &str) -> IndexKey {
        IndexKey::from(vec![IndexValue::from(name)])
    }

    /// Loads, builds and evaluates a pipeline; returns the backend that ran it.
    async fn run(config: &Config) -> (String, Vec<EventSet>) {
        let runtime = RuntimeBuilder::from_config(config).unwrap();
        let pipeline = PipelineBuilder::new(Arc::clone(runtime.operators()))
            .build(config)
            .unwrap();
        let bindings = load_leaf_bindings(config, &pipeline).unwrap();
        let fallbacks: Vec<&str> = config.fallback_backends.iter().map(String::as_str).collect();

        runtime
            .evaluate_with_fallback(
                pipeline.graph(),
                pipeline.outputs(),
                &config.backend,
                &fallbacks,
                &bindings,
            )
            .await
            .unwrap()
    }

    /// Test that the bundled pipeline files load and validate
    #[test]
    fn test_bundled_pipelines_load() {
        let sequential = load_and_validate_config(pipeline_file("sales-sequential.yaml")).unwrap();
        assert_eq!(sequential.strategy, Strategy::Sequential);
        assert_eq!(sequential.backend, "array");
        assert_eq!(sequential.leaves.len(), 1);
        assert_eq!(sequential.operators.len(), 5);
        assert_eq!(sequential.outputs, vec!["revenue_3d", "weekday"]);

        let fallback = load_and_validate_config(pipeline_file("sales-level-fallback.yaml")).unwrap();
        assert_eq!(fallback.strategy, Strategy::Level);
        assert_eq!(fallback.backend_order(), vec!["frame", "array"]);
        assert_eq!(fallback.executor_options.max_concurrency, Some(2));
    }

    /// Rolling revenue and weekday extraction over the bundled sales data
    #[tokio::test]
    async fn test_sequential_pipeline_results() {
        let config = load_and_validate_config(pipeline_file("sales-sequential.yaml")).unwrap();
        let (backend, results) = run(&config).await;

        assert_eq!(backend, "array");
        assert_eq!(results.len(), 2);

        let revenue = &results[0];
        assert_eq!(revenue.schema().features[0].name, "mult_price_units");
        assert_eq!(
            revenue.get(&store("A")).unwrap().features[0],
            Column::from(vec![30.0, 40.0, 64.0, 94.0])
        );
        // Store B's events are listed out of order in the data file.
        let b = revenue.get(&store("B")).unwrap();
        assert_eq!(b.timestamps, vec![1678842000.0, 1678928400.0]);
        assert_eq!(b.features[0], Column::from(vec![20.0, 31.0]));

        let weekday = &results[1];
        assert_eq!(weekday.schema().features[0].name, "calendar_day_of_week");
        assert_eq!(
            weekday.get(&store("A")).unwrap().features[0],
            Column::from(vec![2i32, 3, 4, 5])
        );
    }

    /// Frame lacks MOVING_SUM, so the level strategy falls back to array
    /// and produces the same results as the sequential run.
    #[tokio::test]
    async fn test_fallback_pipeline_matches_sequential() {
        let sequential = load_and_validate_config(pipeline_file("sales-sequential.yaml")).unwrap();
        let fallback = load_and_validate_config(pipeline_file("sales-level-fallback.yaml")).unwrap();

        let (_, expected) = run(&sequential).await;
        let (backend, actual) = run(&fallback).await;

        assert_eq!(backend, "array");
        assert_eq!(actual, expected);
    }

    /// A pipeline fully covered by the frame backend stays on it and agrees
    /// with the array backend.
    #[tokio::test]
    async fn test_frame_pipeline_matches_array() {
        let frame = load_and_validate_config(pipeline_file("frame-only.yaml")).unwrap();
        let mut array = frame.clone();
        array.backend = "array".to_string();

        let (frame_backend, frame_results) = run(&frame).await;
        let (array_backend, array_results) = run(&array).await;

        assert_eq!(frame_backend, "frame");
        assert_eq!(array_backend, "array");
        assert_eq!(frame_results, array_results);

        let names: Vec<&str> = frame_results[0].schema().feature_names();
        assert_eq!(names, vec!["sale_price", "sale_units"]);
    }

    /// Validation errors from a file on disk are reported together
    #[test]
    fn test_invalid_pipeline_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(
            &path,
            r#"
leaves:
  - id: sales
    features: [{ name: price, dtype: float64 }]
operators:
  - id: a
    operator: ADDITION
    inputs: { input_1: sales, input_2: missing }
  - id: b
    operator: ADDITION
    inputs: { input_1: a, input_2: gone }
outputs: [b]
"#,
        )
        .unwrap();

        match load_and_validate_config(&path) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors
                    .iter()
                    .all(|e| matches!(e, ValidationError::UnresolvedReference { .. })));
            }
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    /// Leaves without a data file must be bound by the caller
    #[tokio::test]
    async fn test_unbound_leaf_fails_evaluation() {
        let mut config = load_and_validate_config(pipeline_file("sales-sequential.yaml")).unwrap();
        config.leaves[0].data = None;

        let runtime = RuntimeBuilder::from_config(&config).unwrap();
        let pipeline = PipelineBuilder::new(Arc::clone(runtime.operators()))
            .build(&config)
            .unwrap();
        let bindings = load_leaf_bindings(&config, &pipeline).unwrap();
        assert!(bindings.is_empty());

        let result = runtime
            .evaluate(pipeline.graph(), pipeline.outputs(), "array", &bindings)
            .await;
        assert!(result.is_err());
    }
}
