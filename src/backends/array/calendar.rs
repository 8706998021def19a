// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::backends::{collect_groups, expect_inputs, expect_output, Group};
use crate::data::{Column, EventSet, IndexData};
use crate::errors::ExecutorError;
use crate::operators::calendar::CalendarUnit;
use crate::operators::Attributes;
use crate::schema::Schema;
use crate::traits::OperatorExecutor;

/// Extracts one calendar field, in UTC, from each timestamp.
pub struct CalendarExtract(pub CalendarUnit);

impl OperatorExecutor for CalendarExtract {
    fn execute(
        &self,
        inputs: &[&EventSet],
        _attributes: &Attributes,
        outputs: &[Schema],
    ) -> Result<Vec<EventSet>, ExecutorError> {
        let [sampling] = expect_inputs::<1>(inputs)?;
        let schema = expect_output(outputs)?;

        let groups = sampling.iter().map(|(key, data)| -> Group {
            let values = data
                .timestamps
                .iter()
                .map(|t| extract(self.0, *t))
                .collect::<Result<Vec<i32>, _>>()?;
            Ok((
                key.clone(),
                IndexData::new(data.timestamps.clone(), vec![Column::Int32(values)]),
            ))
        });
        Ok(vec![collect_groups(schema, groups)?])
    }

    fn name(&self) -> &'static str {
        "array_calendar"
    }
}

/// Calendar field of a unix timestamp in seconds. Fractional seconds are
/// floored, so -0.5 falls on 1969-12-31T23:59:59.
pub fn extract(unit: CalendarUnit, timestamp: f64) -> Result<i32, ExecutorError> {
    let datetime = to_datetime(timestamp)?;
    let value = match unit {
        CalendarUnit::Year => datetime.year(),
        CalendarUnit::Month => datetime.month() as i32,
        CalendarUnit::DayOfMonth => datetime.day() as i32,
        CalendarUnit::DayOfWeek => datetime.weekday().num_days_from_monday() as i32,
        CalendarUnit::Hour => datetime.hour() as i32,
        CalendarUnit::Minute => datetime.minute() as i32,
        CalendarUnit::Second => datetime.second() as i32,
    };
    Ok(value)
}

fn to_datetime(timestamp: f64) -> Result<DateTime<Utc>, ExecutorError> {
    let out_of_range =
        || ExecutorError::InvalidInput(format!("timestamp {} is not a valid unix time", timestamp));
    if !timestamp.is_finite() {
        return Err(out_of_range());
    }
    let seconds = timestamp.floor();
    let nanos = ((timestamp - seconds) * 1e9) as u32;
    DateTime::from_timestamp(seconds as i64, nanos.min(999_999_999)).ok_or_else(out_of_range)
}
