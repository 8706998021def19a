// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::{collect_groups, expect_output, Group};
use crate::data::{Column, EventSet, IndexData, IndexKey};
use crate::errors::ExecutorError;
use crate::operators::{window, Attributes};
use crate::schema::Schema;
use crate::traits::OperatorExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    Sum,
    StandardDeviation,
}

pub struct MovingWindow(pub WindowKind);

impl OperatorExecutor for MovingWindow {
    fn execute(
        &self,
        inputs: &[&EventSet],
        attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let (input, sampling) = match inputs {
            [input] => (*input, None),
            [input, sampling] => (*input, Some(*sampling)),
            _ => {
                return Err(ExecutorError::InvalidInput(format!(
                    "expected 1 or 2 inputs, got {}",
                    inputs.len()
                )))
            }
        };
        let schema = expect_output(outputs)?;
        let window = attributes.float(window::WINDOW_LENGTH).ok_or_else(|| {
            ExecutorError::InvalidInput("missing attribute 'window_length'".to_string())
        })?;

        let output = match sampling {
            None => collect_groups(
                schema,
                input
                    .iter()
                    .map(|(key, data)| self.group(key, data, &data.timestamps, window)),
            )?,
            Some(sampling) => {
                // Sampling keys absent from the input see empty windows.
                let empty = IndexData::new(
                    Vec::new(),
                    input.schema().features.iter().map(|f| Column::empty(f.dtype)).collect(),
                );
                collect_groups(
                    schema,
                    sampling.iter().map(|(key, ticks)| {
                        let data = input.get(key).unwrap_or(&empty);
                        self.group(key, data, &ticks.timestamps, window)
                    }),
                )?
            }
        };
        Ok(vec![output])
    }

    fn name(&self) -> &'static str {
        match self.0 {
            WindowKind::Sum => "array_moving_sum",
            WindowKind::StandardDeviation => "array_moving_standard_deviation",
        }
    }
}

impl MovingWindow {
    /// Evaluates every feature of `data` at the times `at`.
    fn group(&self, key: &IndexKey, data: &IndexData, at: &[f64], window: f64) -> Group {
        let features = data
            .features
            .iter()
            .map(|column| match self.0 {
                WindowKind::Sum => sum_column(&data.timestamps, column, at, window),
                WindowKind::StandardDeviation => deviation_column(&data.timestamps, column, at, window),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((key.clone(), IndexData::new(at.to_vec(), features)))
    }
}

/// Running aggregate over the events currently inside a window.
trait Window<T> {
    type Output;
    fn enter(&mut self, value: T);
    fn leave(&mut self, value: T);
    fn value(&self) -> Self::Output;
}

/// For each time `t` in `at`, feeds `state` exactly the events with timestamp
/// in `(t - window, t]` and reads it. Both `timestamps` and `at` are sorted.
fn slide<T: Copy, W: Window<T>>(
    timestamps: &[f64],
    values: &[T],
    at: &[f64],
    window: f64,
    mut state: W,
) -> Vec<W::Output> {
    let mut results = Vec::with_capacity(at.len());
    let (mut start, mut end) = (0, 0);

    for &t in at {
        while end < values.len() && timestamps[end] <= t {
            state.enter(values[end]);
            end += 1;
        }
        while start < end && timestamps[start] <= t - window {
            state.leave(values[start]);
            start += 1;
        }
        results.push(state.value());
    }
    results
}

/// Integer sum; wraps on overflow like integer arithmetic. Wrapping addition
/// is exactly undone by wrapping subtraction, so leaving events restores the
/// true sum.
#[derive(Default)]
struct IntSum(i64);

impl Window<i64> for IntSum {
    type Output = i64;

    fn enter(&mut self, value: i64) {
        self.0 = self.0.wrapping_add(value);
    }

    fn leave(&mut self, value: i64) {
        self.0 = self.0.wrapping_sub(value);
    }

    fn value(&self) -> i64 {
        self.0
    }
}

/// Float sum skipping NaN. Infinities are counted rather than added, so one
/// leaving the window does not leave `inf - inf` behind.
#[derive(Default)]
struct FloatSum {
    finite: f64,
    count: usize,
    positive: usize,
    negative: usize,
}

impl Window<f64> for FloatSum {
    type Output = f64;

    fn enter(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if value == f64::INFINITY {
            self.positive += 1;
        } else if value == f64::NEG_INFINITY {
            self.negative += 1;
        } else {
            self.finite += value;
            self.count += 1;
        }
    }

    fn leave(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if value == f64::INFINITY {
            self.positive -= 1;
        } else if value == f64::NEG_INFINITY {
            self.negative -= 1;
        } else {
            self.count -= 1;
            // Drop rounding residue once the window holds no finite value.
            self.finite = if self.count == 0 { 0.0 } else { self.finite - value };
        }
    }

    fn value(&self) -> f64 {
        match (self.positive > 0, self.negative > 0) {
            (true, true) => f64::NAN,
            (true, false) => f64::INFINITY,
            (false, true) => f64::NEG_INFINITY,
            (false, false) => self.finite,
        }
    }
}

/// Population standard deviation skipping NaN; NaN for an empty window or
/// one holding an infinity.
#[derive(Default)]
struct Moments {
    count: usize,
    sum: f64,
    sum_squares: f64,
    infinite: usize,
}

impl Window<f64> for Moments {
    type Output = f64;

    fn enter(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if value.is_infinite() {
            self.infinite += 1;
        } else {
            self.count += 1;
            self.sum += value;
            self.sum_squares += value * value;
        }
    }

    fn leave(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if value.is_infinite() {
            self.infinite -= 1;
        } else {
            self.count -= 1;
            if self.count == 0 {
                self.sum = 0.0;
                self.sum_squares = 0.0;
            } else {
                self.sum -= value;
                self.sum_squares -= value * value;
            }
        }
    }

    fn value(&self) -> f64 {
        if self.count == 0 || self.infinite > 0 {
            return f64::NAN;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        (self.sum_squares / n - mean * mean).max(0.0).sqrt()
    }
}

/// Sums keep the input type. Int32 sums accumulate in i64; truncating the
/// wrapped i64 total gives the wrapped i32 total.
fn sum_column(
    timestamps: &[f64],
    column: &Column,
    at: &[f64],
    window: f64,
) -> Result<Column, ExecutorError> {
    let summed = match column {
        Column::Float64(v) => Column::Float64(slide(timestamps, v, at, window, FloatSum::default())),
        Column::Float32(v) => {
            let values: Vec<f64> = v.iter().map(|x| *x as f64).collect();
            Column::Float32(
                slide(timestamps, &values, at, window, FloatSum::default())
                    .into_iter()
                    .map(|x| x as f32)
                    .collect(),
            )
        }
        Column::Int64(v) => Column::Int64(slide(timestamps, v, at, window, IntSum::default())),
        Column::Int32(v) => {
            let values: Vec<i64> = v.iter().map(|x| *x as i64).collect();
            Column::Int32(
                slide(timestamps, &values, at, window, IntSum::default())
                    .into_iter()
                    .map(|x| x as i32)
                    .collect(),
            )
        }
        other => {
            return Err(ExecutorError::InvalidInput(format!(
                "cannot sum a {} column",
                other.dtype()
            )))
        }
    };
    Ok(summed)
}

fn deviation_column(
    timestamps: &[f64],
    column: &Column,
    at: &[f64],
    window: f64,
) -> Result<Column, ExecutorError> {
    let values = column.to_f64().ok_or_else(|| {
        ExecutorError::InvalidInput(format!(
            "cannot compute a deviation over a {} column",
            column.dtype()
        ))
    })?;

    let deviations = slide(timestamps, &values, at, window, Moments::default());
    Ok(match column {
        Column::Float32(_) => Column::Float32(deviations.into_iter().map(|x| x as f32).collect()),
        _ => Column::Float64(deviations),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::IndexValue;
    use crate::schema::{FeatureSchema, FeatureType, IndexSchema};

    fn sums(timestamps: &[f64], values: &[f64], window: f64) -> Vec<f64> {
        slide(timestamps, values, timestamps, window, FloatSum::default())
    }

    fn store(name: &str) -> IndexKey {
        IndexKey::from(vec![IndexValue::from(name)])
    }

    fn indexed(features: &[(&str, FeatureType)]) -> Schema {
        Schema::new(
            features
                .iter()
                .map(|(n, t)| FeatureSchema::new(*n, *t))
                .collect(),
            vec![IndexSchema::new("store", FeatureType::String).unwrap()],
        )
    }

    fn attributes(window_length: f64) -> Attributes {
        Attributes::new().with(window::WINDOW_LENGTH, window_length)
    }

    #[test]
    fn test_window_bounds() {
        let timestamps = [1.0, 2.0, 2.0, 5.0, 6.0];
        let values = [1i64, 2, 3, 4, 5];

        assert_eq!(
            slide(&timestamps, &values, &timestamps, 2.0, IntSum::default()),
            vec![1, 6, 6, 4, 9]
        );
        assert_eq!(
            slide(&timestamps, &values, &timestamps, f64::INFINITY, IntSum::default()),
            vec![1, 6, 6, 10, 15]
        );
    }

    #[test]
    fn test_integer_sums_wrap() {
        let timestamps = [1.0, 2.0, 20.0];

        let wide = Column::Int64(vec![i64::MAX, 1, 5]);
        assert_eq!(
            sum_column(&timestamps, &wide, &timestamps, 10.0).unwrap(),
            Column::Int64(vec![i64::MAX, i64::MIN, 5])
        );

        let narrow = Column::Int32(vec![i32::MAX, 1, 5]);
        assert_eq!(
            sum_column(&timestamps, &narrow, &timestamps, 10.0).unwrap(),
            Column::Int32(vec![i32::MAX, i32::MIN, 5])
        );
    }

    #[test]
    fn test_infinity_leaving_the_window() {
        assert_eq!(
            sums(&[0.0, 1.0, 2.0], &[f64::INFINITY, 1.0, 1.0], 1.0),
            vec![f64::INFINITY, 1.0, 1.0]
        );
        assert_eq!(
            sums(&[0.0, 1.0, 2.0], &[1.0, f64::NEG_INFINITY, 2.0], 1.5),
            vec![1.0, f64::NEG_INFINITY, f64::NEG_INFINITY]
        );

        let mixed = sums(&[0.0, 1.0, 2.0], &[f64::INFINITY, f64::NEG_INFINITY, 3.0], 1.5);
        assert_eq!(mixed[0], f64::INFINITY);
        assert!(mixed[1].is_nan());
        assert_eq!(mixed[2], f64::NEG_INFINITY);
    }

    #[test]
    fn test_sum_skips_nan() {
        assert_eq!(
            sums(&[0.0, 1.0, 2.0], &[1.0, f64::NAN, 2.0], 1.5),
            vec![1.0, 1.0, 2.0]
        );
    }

    #[test]
    fn test_standard_deviation() {
        let timestamps = [0.0, 1.0, 2.0];
        let deviations = deviation_column(
            &timestamps,
            &Column::from(vec![1.0, 3.0, 7.0]),
            &timestamps,
            1.5,
        )
        .unwrap();
        assert_eq!(deviations, Column::Float64(vec![0.0, 1.0, 2.0]));

        let from_ints = deviation_column(&timestamps, &Column::from(vec![1i32, 3, 7]), &timestamps, 1.5)
            .unwrap();
        assert_eq!(from_ints, deviations);

        let with_gaps = deviation_column(
            &timestamps,
            &Column::from(vec![f64::INFINITY, f64::NAN, 4.0]),
            &timestamps,
            1.5,
        )
        .unwrap()
        .to_f64()
        .unwrap();
        assert!(with_gaps[0].is_nan());
        assert!(with_gaps[1].is_nan());
        assert_eq!(with_gaps[2], 0.0);
    }

    #[test]
    fn test_sampled_windows() {
        let schema = indexed(&[("x", FeatureType::Int64)]);
        let input = EventSet::new(schema.clone()).with_group(
            store("A"),
            vec![1.0, 2.0, 3.0],
            vec![Column::from(vec![1i64, 2, 3])],
        );
        let sampling = EventSet::new(indexed(&[]))
            .with_group(store("A"), vec![0.0, 2.5, 10.0], vec![])
            .with_group(store("B"), vec![5.0], vec![]);

        let out = MovingWindow(WindowKind::Sum)
            .execute(&[&input, &sampling], &attributes(2.0), &[schema.clone()])
            .unwrap();

        let expected = EventSet::new(schema)
            .with_group(store("A"), vec![0.0, 2.5, 10.0], vec![Column::from(vec![0i64, 3, 0])])
            .with_group(store("B"), vec![5.0], vec![Column::from(vec![0i64])]);
        assert_eq!(out, vec![expected]);
    }

    #[test]
    fn test_sampled_deviation_of_missing_key_is_nan() {
        let input = EventSet::new(indexed(&[("x", FeatureType::Float32)]))
            .with_group(store("A"), vec![1.0, 2.0], vec![Column::Float32(vec![1.0, 3.0])]);
        let sampling = EventSet::new(indexed(&[])).with_group(store("B"), vec![5.0], vec![]);
        let schema = indexed(&[("x", FeatureType::Float32)]);

        let out = MovingWindow(WindowKind::StandardDeviation)
            .execute(&[&input, &sampling], &attributes(10.0), &[schema])
            .unwrap();

        assert_eq!(out[0].len(), 1);
        let b = out[0].get(&store("B")).unwrap();
        assert_eq!(b.timestamps, vec![5.0]);
        match &b.features[0] {
            Column::Float32(v) => assert!(v[0].is_nan()),
            other => panic!("expected a float32 column, got {:?}", other),
        }
    }
}
