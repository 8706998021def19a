// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::accelerated::ACCELERATED;
use crate::backends::array::ARRAY;
use crate::backends::frame::FRAME;
use crate::config::{Runtime, RuntimeBuilder};
use crate::data::{Column, EventSet, IndexKey, IndexValue};
use crate::engine::{LeafBindings, LevelByLevelExecutor, SequentialExecutor};
use crate::errors::{ExecutionError, GraphError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::operators::{arithmetic, arithmetic_scalar, calendar, cast, filter, select, window};
use crate::schema::{FeatureSchema, FeatureType, IndexSchema, Schema};

/// End-to-end evaluation over the builtin registries
#[cfg(test)]
mod tests {
    use super::*;

    fn sequential() -> Runtime {
        let implementations = RuntimeBuilder::builtin_registries().unwrap();
        Runtime::new(implementations, Box::new(SequentialExecutor::new()))
    }

    fn level(max_concurrency: usize) -> Runtime {
        let implementations = RuntimeBuilder::builtin_registries().unwrap();
        Runtime::new(implementations, Box::new(LevelByLevelExecutor::new(max_concurrency)))
    }

    fn schema(features: &[(&str, FeatureType)]) -> Schema {
        Schema::new(
            features
                .iter()
                .map(|(name, dtype)| FeatureSchema::new(*name, *dtype))
                .collect(),
            vec![IndexSchema::new("store", FeatureType::String).unwrap()],
        )
        .with_unix_timestamp(true)
    }

    fn store(name: &str) -> IndexKey {
        IndexKey::from(vec![IndexValue::from(name)])
    }

    fn events(schema: Schema, column: Column) -> EventSet {
        EventSet::new(schema).with_group(store("A"), vec![0.0, 86400.0, 172800.0], vec![column])
    }

    /// Two float leaves over the same sampling.
    fn numerator_denominator(graph: &mut Graph) -> (NodeId, NodeId, LeafBindings) {
        let x = schema(&[("x", FeatureType::Float64)]);
        let y = schema(&[("y", FeatureType::Float64)]);
        let numerator = graph.leaf("numerator", x.clone());
        let denominator = graph.leaf("denominator", y.clone());
        let bindings = LeafBindings::new()
            .with(numerator, events(x, Column::from(vec![10.0, 20.0, 30.0])))
            .with(denominator, events(y, Column::from(vec![2.0, 2.0, 2.0])));
        (numerator, denominator, bindings)
    }

    #[tokio::test]
    async fn test_divide_two_leaves() {
        let runtime = sequential();
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let (numerator, denominator, bindings) = numerator_denominator(&mut graph);
        let ratio = arithmetic::divide(&mut graph, numerator, denominator).unwrap();

        let results = runtime.evaluate(&graph, &[ratio], ARRAY, &bindings).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].schema().features[0].name, "div_x_y");
        let group = results[0].get(&store("A")).unwrap();
        assert_eq!(group.timestamps, vec![0.0, 86400.0, 172800.0]);
        assert_eq!(group.features[0], Column::from(vec![5.0, 10.0, 15.0]));
    }

    #[test]
    fn test_integer_division_rejected_at_construction() {
        let runtime = sequential();
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let counts = graph.leaf("counts", schema(&[("n", FeatureType::Int64)]));

        let result = arithmetic_scalar::divide_scalar(&mut graph, counts, 2.0);

        assert!(matches!(result, Err(GraphError::TypeContract { .. })));
        assert!(graph.instances().is_empty());
    }

    #[tokio::test]
    async fn test_unimplemented_backend_fails_before_any_step() {
        let runtime = sequential();
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let (numerator, denominator, bindings) = numerator_denominator(&mut graph);
        let ratio = arithmetic::divide(&mut graph, numerator, denominator).unwrap();

        let result = runtime.evaluate(&graph, &[ratio], ACCELERATED, &bindings).await;

        match result {
            Err(ExecutionError::Registry(RegistryError::BackendNotImplemented { key, backend })) => {
                assert_eq!(key, "DIVISION");
                assert_eq!(backend, ACCELERATED);
            }
            other => panic!("expected BackendNotImplemented, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_select_everything_is_identity() {
        let runtime = sequential();
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let sales = schema(&[("price", FeatureType::Float64)]);
        let leaf = graph.leaf("sales", sales.clone());
        let data = events(sales, Column::from(vec![1.5, 2.5, 3.5]));
        let all = select::select(&mut graph, leaf, &["price"]).unwrap();

        let bindings = LeafBindings::new().with(leaf, data.clone());
        let results = runtime.evaluate(&graph, &[all, leaf], ARRAY, &bindings).await.unwrap();

        assert_eq!(results, vec![data.clone(), data]);
    }

    /// MOVING_SUM has no frame implementation; requesting only the SELECT
    /// branch must not need it.
    #[tokio::test]
    async fn test_unrequested_branches_are_pruned() {
        let runtime = sequential();
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let sales = schema(&[("price", FeatureType::Float64)]);
        let leaf = graph.leaf("sales", sales.clone());
        let selected = select::select(&mut graph, leaf, &["price"]).unwrap();
        let rolling = window::moving_sum(&mut graph, selected, 86400.0, None).unwrap();
        let bindings = LeafBindings::new().with(leaf, events(sales, Column::from(vec![1.0, 2.0, 3.0])));

        assert!(runtime.evaluate(&graph, &[selected], FRAME, &bindings).await.is_ok());
        let full = runtime.evaluate(&graph, &[rolling], FRAME, &bindings).await;
        assert!(full.unwrap_err().is_backend_not_implemented());
    }

    #[tokio::test]
    async fn test_evaluation_is_deterministic() {
        let runtime = level(4);
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let (numerator, denominator, bindings) = numerator_denominator(&mut graph);
        let sum = arithmetic::add(&mut graph, numerator, denominator).unwrap();
        let scaled = arithmetic_scalar::multiply_scalar(&mut graph, sum, 3.0).unwrap();
        let rolling = window::cumsum(&mut graph, scaled, None).unwrap();

        let first = runtime.evaluate(&graph, &[rolling, sum], ARRAY, &bindings).await.unwrap();
        for _ in 0..5 {
            let again = runtime.evaluate(&graph, &[rolling, sum], ARRAY, &bindings).await.unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(
            first[0].get(&store("A")).unwrap().features[0],
            Column::from(vec![36.0, 102.0, 198.0])
        );
    }

    /// Diamond: both strategies produce identical results.
    #[tokio::test]
    async fn test_strategies_agree() {
        let runtime = sequential();
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let (numerator, denominator, bindings) = numerator_denominator(&mut graph);
        let left = arithmetic_scalar::add_scalar(&mut graph, numerator, 1.0).unwrap();
        let right = arithmetic_scalar::subtract_scalar(&mut graph, denominator, 1.0).unwrap();
        let product = arithmetic::multiply(&mut graph, left, right).unwrap();
        let weekday = calendar::calendar_day_of_week(&mut graph, product).unwrap();
        let requested = [product, weekday, left];

        let expected = runtime.evaluate(&graph, &requested, ARRAY, &bindings).await.unwrap();
        for limit in [1, 2, 8] {
            let actual = level(limit)
                .evaluate(&graph, &requested, ARRAY, &bindings)
                .await
                .unwrap();
            assert_eq!(actual, expected, "max_concurrency {}", limit);
        }

        // 1970-01-01 was a Thursday.
        assert_eq!(
            expected[1].get(&store("A")).unwrap().features[0],
            Column::from(vec![3i32, 4, 5])
        );
    }

    #[tokio::test]
    async fn test_fallback_moves_on_only_for_missing_implementations() {
        let runtime = sequential();
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let counts_schema = schema(&[("n", FeatureType::Int64)]);
        let counts = graph.leaf("counts", counts_schema.clone());
        let as_float = cast::cast(&mut graph, counts, FeatureType::Float64).unwrap();
        let rolling = window::moving_sum(&mut graph, as_float, 100_000.0, None).unwrap();
        let bindings = LeafBindings::new().with(counts, events(counts_schema, Column::from(vec![1i64, 2, 3])));

        let (backend, results) = runtime
            .evaluate_with_fallback(&graph, &[rolling], ACCELERATED, &[FRAME, ARRAY], &bindings)
            .await
            .unwrap();
        assert_eq!(backend, ARRAY);
        assert_eq!(
            results[0].get(&store("A")).unwrap().features[0],
            Column::from(vec![1.0, 3.0, 5.0])
        );

        // A missing leaf is not a backend problem; no fallback happens.
        let missing = runtime
            .evaluate_with_fallback(&graph, &[rolling], ARRAY, &[FRAME], &LeafBindings::new())
            .await;
        assert_eq!(
            missing.unwrap_err(),
            ExecutionError::MissingLeafBinding {
                leaf: "counts".to_string()
            }
        );

        // Out of backends: the last missing implementation is reported.
        let exhausted = runtime
            .evaluate_with_fallback(&graph, &[rolling], ACCELERATED, &[FRAME], &bindings)
            .await;
        assert!(exhausted.unwrap_err().is_backend_not_implemented());
    }

    #[tokio::test]
    async fn test_filter_by_boolean_condition() {
        let runtime = level(2);
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let price_schema = schema(&[("price", FeatureType::Float64)]);
        let keep_schema = schema(&[("keep", FeatureType::Boolean)]);
        let prices = graph.leaf("prices", price_schema.clone());
        let keep = graph.leaf("keep", keep_schema.clone());
        let kept = filter::filter(&mut graph, prices, keep).unwrap();

        let bindings = LeafBindings::new()
            .with(prices, events(price_schema, Column::from(vec![1.0, 2.0, 3.0])))
            .with(keep, events(keep_schema, Column::from(vec![true, false, true])));

        for backend in [ARRAY, FRAME] {
            let results = runtime.evaluate(&graph, &[kept], backend, &bindings).await.unwrap();
            let group = results[0].get(&store("A")).unwrap();
            assert_eq!(group.timestamps, vec![0.0, 172800.0], "backend {}", backend);
            assert_eq!(group.features[0], Column::from(vec![1.0, 3.0]));
        }
    }

    #[tokio::test]
    async fn test_missing_leaf_binding() {
        let runtime = sequential();
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let (numerator, denominator, _) = numerator_denominator(&mut graph);
        let ratio = arithmetic::divide(&mut graph, numerator, denominator).unwrap();

        let x = schema(&[("x", FeatureType::Float64)]);
        let partial = LeafBindings::new().with(numerator, events(x, Column::from(vec![1.0, 2.0, 3.0])));
        let result = runtime.evaluate(&graph, &[ratio], ARRAY, &partial).await;

        assert_eq!(
            result.unwrap_err(),
            ExecutionError::MissingLeafBinding {
                leaf: "denominator".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_mismatched_sampling_fails_the_evaluation() {
        let runtime = sequential();
        let mut graph = Graph::new(Arc::clone(runtime.operators()));
        let x = schema(&[("x", FeatureType::Float64)]);
        let y = schema(&[("y", FeatureType::Float64)]);
        let left = graph.leaf("left", x.clone());
        let right = graph.leaf("right", y.clone());
        let sum = arithmetic::add(&mut graph, left, right).unwrap();

        let bindings = LeafBindings::new()
            .with(left, events(x, Column::from(vec![1.0, 2.0, 3.0])))
            .with(
                right,
                EventSet::new(y).with_group(store("A"), vec![0.0, 1.0, 2.0], vec![Column::from(vec![1.0, 1.0, 1.0])]),
            );

        let result = runtime.evaluate(&graph, &[sum], ARRAY, &bindings).await;
        assert!(matches!(result, Err(ExecutionError::ExecutorFailed { .. })));
    }

    /// Window aggregates evaluated at the events of a second leaf
    #[tokio::test]
    async fn test_windows_at_sampling_events() {
        let mut graph = Graph::new(Arc::clone(sequential().operators()));
        let prices = schema(&[("price", FeatureType::Float64)]);
        let ticks = schema(&[]);
        let leaf = graph.leaf("prices", prices.clone());
        let tick_leaf = graph.leaf("ticks", ticks.clone());
        let total = window::moving_sum(&mut graph, leaf, 172800.0, Some(tick_leaf)).unwrap();
        let spread = window::moving_standard_deviation(&mut graph, leaf, 172800.0, Some(tick_leaf)).unwrap();

        let bindings = LeafBindings::new()
            .with(leaf, events(prices, Column::from(vec![1.0, 3.0, 7.0])))
            .with(
                tick_leaf,
                EventSet::new(ticks).with_group(store("A"), vec![86400.0, 259200.0], vec![]),
            );

        let expected = sequential()
            .evaluate(&graph, &[total, spread], ARRAY, &bindings)
            .await
            .unwrap();
        let actual = level(2)
            .evaluate(&graph, &[total, spread], ARRAY, &bindings)
            .await
            .unwrap();
        assert_eq!(actual, expected);

        let sums = expected[0].get(&store("A")).unwrap();
        assert_eq!(sums.timestamps, vec![86400.0, 259200.0]);
        assert_eq!(sums.features[0], Column::from(vec![4.0, 7.0]));
        let deviations = expected[1].get(&store("A")).unwrap();
        assert_eq!(deviations.features[0], Column::from(vec![1.0, 0.0]));

        let frame = sequential()
            .evaluate(&graph, &[spread], FRAME, &bindings)
            .await;
        assert!(frame.unwrap_err().is_backend_not_implemented());
    }
}
