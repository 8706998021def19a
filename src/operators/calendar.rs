// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Calendar fields extracted from unix timestamps, in UTC.

use crate::errors::{GraphError, RegistryError};
use crate::graph::{Graph, NodeId};
use crate::operators::{
    Attributes, FeatureConstraint, InferFn, OperatorContext, OperatorDefinition,
    OperatorRegistry,
};
use crate::schema::{FeatureSchema, FeatureType, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarUnit {
    Year,
    Month,
    DayOfMonth,
    /// Monday is 0.
    DayOfWeek,
    Hour,
    Minute,
    Second,
}

impl CalendarUnit {
    pub const ALL: [CalendarUnit; 7] = [
        CalendarUnit::Year,
        CalendarUnit::Month,
        CalendarUnit::DayOfMonth,
        CalendarUnit::DayOfWeek,
        CalendarUnit::Hour,
        CalendarUnit::Minute,
        CalendarUnit::Second,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CalendarUnit::Year => "CALENDAR_YEAR",
            CalendarUnit::Month => "CALENDAR_MONTH",
            CalendarUnit::DayOfMonth => "CALENDAR_DAY_OF_MONTH",
            CalendarUnit::DayOfWeek => "CALENDAR_DAY_OF_WEEK",
            CalendarUnit::Hour => "CALENDAR_HOUR",
            CalendarUnit::Minute => "CALENDAR_MINUTE",
            CalendarUnit::Second => "CALENDAR_SECOND",
        }
    }

    pub fn from_key(key: &str) -> Option<CalendarUnit> {
        Self::ALL.into_iter().find(|unit| unit.key() == key)
    }

    /// Name of the single output feature.
    pub fn feature_name(self) -> &'static str {
        match self {
            CalendarUnit::Year => "calendar_year",
            CalendarUnit::Month => "calendar_month",
            CalendarUnit::DayOfMonth => "calendar_day_of_month",
            CalendarUnit::DayOfWeek => "calendar_day_of_week",
            CalendarUnit::Hour => "calendar_hour",
            CalendarUnit::Minute => "calendar_minute",
            CalendarUnit::Second => "calendar_second",
        }
    }

    fn infer(self, ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
        let sampling = ctx.input(0);
        if !sampling.is_unix_timestamp {
            return Err(ctx.type_error(
                "calendar operators require unix timestamps; set is_unix_timestamp on the input",
            ));
        }
        Ok(vec![sampling.with_features(vec![FeatureSchema::new(
            self.feature_name(),
            FeatureType::Int32,
        )])])
    }
}

fn infer_year(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    CalendarUnit::Year.infer(ctx)
}

fn infer_month(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    CalendarUnit::Month.infer(ctx)
}

fn infer_day_of_month(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    CalendarUnit::DayOfMonth.infer(ctx)
}

fn infer_day_of_week(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    CalendarUnit::DayOfWeek.infer(ctx)
}

fn infer_hour(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    CalendarUnit::Hour.infer(ctx)
}

fn infer_minute(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    CalendarUnit::Minute.infer(ctx)
}

fn infer_second(ctx: &OperatorContext<'_>) -> Result<Vec<Schema>, GraphError> {
    CalendarUnit::Second.infer(ctx)
}

pub fn register(registry: &mut OperatorRegistry) -> Result<(), RegistryError> {
    let infers: [(CalendarUnit, InferFn); 7] = [
        (CalendarUnit::Year, infer_year),
        (CalendarUnit::Month, infer_month),
        (CalendarUnit::DayOfMonth, infer_day_of_month),
        (CalendarUnit::DayOfWeek, infer_day_of_week),
        (CalendarUnit::Hour, infer_hour),
        (CalendarUnit::Minute, infer_minute),
        (CalendarUnit::Second, infer_second),
    ];

    for (unit, infer) in infers {
        registry.register(
            OperatorDefinition::new(unit.key(), infer)
                .input("sampling", FeatureConstraint::Any)
                .output("output"),
        )?;
    }
    Ok(())
}

pub fn calendar(graph: &mut Graph, unit: CalendarUnit, sampling: NodeId) -> Result<NodeId, GraphError> {
    graph.apply_single(unit.key(), &[sampling], Attributes::new())
}

pub fn calendar_year(graph: &mut Graph, sampling: NodeId) -> Result<NodeId, GraphError> {
    calendar(graph, CalendarUnit::Year, sampling)
}

pub fn calendar_month(graph: &mut Graph, sampling: NodeId) -> Result<NodeId, GraphError> {
    calendar(graph, CalendarUnit::Month, sampling)
}

pub fn calendar_day_of_month(graph: &mut Graph, sampling: NodeId) -> Result<NodeId, GraphError> {
    calendar(graph, CalendarUnit::DayOfMonth, sampling)
}

pub fn calendar_day_of_week(graph: &mut Graph, sampling: NodeId) -> Result<NodeId, GraphError> {
    calendar(graph, CalendarUnit::DayOfWeek, sampling)
}

pub fn calendar_hour(graph: &mut Graph, sampling: NodeId) -> Result<NodeId, GraphError> {
    calendar(graph, CalendarUnit::Hour, sampling)
}

pub fn calendar_minute(graph: &mut Graph, sampling: NodeId) -> Result<NodeId, GraphError> {
    calendar(graph, CalendarUnit::Minute, sampling)
}

pub fn calendar_second(graph: &mut Graph, sampling: NodeId) -> Result<NodeId, GraphError> {
    calendar(graph, CalendarUnit::Second, sampling)
}
