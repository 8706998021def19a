// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::data::{Column, EventSet, IndexData, IndexKey, Value};
use crate::errors::ExecutorError;
use crate::schema::Schema;

/// One event: its index key, timestamp and feature cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub key: IndexKey,
    pub timestamp: f64,
    pub values: Vec<Value>,
}

/// Row-oriented view of an event collection.
///
/// `keys` remembers every index key of the source, including keys whose
/// events were all dropped, so converting back preserves empty groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub keys: Vec<IndexKey>,
    pub rows: Vec<Row>,
}

impl Frame {
    pub fn from_event_set(events: &EventSet) -> Result<Frame, ExecutorError> {
        let mut rows = Vec::with_capacity(events.num_events());
        for (key, data) in events.iter() {
            for (row, timestamp) in data.timestamps.iter().enumerate() {
                let values = data
                    .features
                    .iter()
                    .map(|column| {
                        column.get(row).ok_or_else(|| {
                            ExecutorError::InvalidInput(format!(
                                "feature column shorter than timestamps for index key {}",
                                key
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                rows.push(Row {
                    key: key.clone(),
                    timestamp: *timestamp,
                    values,
                });
            }
        }
        Ok(Frame {
            keys: events.keys().cloned().collect(),
            rows,
        })
    }

    /// Regroups rows by key. Rows of one key must appear in timestamp order.
    pub fn into_event_set(self, schema: &Schema) -> Result<EventSet, ExecutorError> {
        let empty = || {
            IndexData::new(
                Vec::new(),
                schema.features.iter().map(|f| Column::empty(f.dtype)).collect(),
            )
        };

        let mut events = EventSet::new(schema.clone());
        for key in &self.keys {
            events.insert(key.clone(), empty());
        }

        let mut current: Option<(IndexKey, IndexData)> = None;
        for row in self.rows {
            if current.as_ref().map(|(key, _)| key != &row.key).unwrap_or(true) {
                if let Some((key, data)) = current.take() {
                    events.insert(key, data);
                }
                current = Some((row.key.clone(), empty()));
            }
            if let Some((_, data)) = current.as_mut() {
                if row.values.len() != data.features.len() {
                    return Err(ExecutorError::InvalidInput(format!(
                        "row has {} values, schema declares {} features",
                        row.values.len(),
                        data.features.len()
                    )));
                }
                data.timestamps.push(row.timestamp);
                for (column, value) in data.features.iter_mut().zip(row.values) {
                    column.push(value).map_err(ExecutorError::InvalidInput)?;
                }
            }
        }
        if let Some((key, data)) = current {
            events.insert(key, data);
        }
        Ok(events)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::IndexValue;
    use crate::schema::{FeatureSchema, FeatureType, IndexSchema};

    fn events() -> EventSet {
        let schema = Schema::new(
            vec![
                FeatureSchema::new("price", FeatureType::Float64),
                FeatureSchema::new("store", FeatureType::String),
            ],
            vec![IndexSchema::new("region", FeatureType::String).unwrap()],
        );
        EventSet::new(schema)
            .with_group(
                vec![IndexValue::from("eu")],
                vec![1.0, 2.0],
                vec![
                    Column::from(vec![1.0, 2.0]),
                    Column::String(vec!["a".to_string(), "b".to_string()]),
                ],
            )
            .with_group(
                vec![IndexValue::from("us")],
                vec![3.0],
                vec![Column::from(vec![3.0]), Column::String(vec!["c".to_string()])],
            )
    }

    #[test]
    fn test_rows_follow_key_order() {
        let frame = Frame::from_event_set(&events()).unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.keys.len(), 2);
        assert_eq!(frame.rows[2].key, IndexKey::from(vec![IndexValue::from("us")]));
        assert_eq!(frame.rows[1].values[1], Value::String("b".to_string()));
    }

    #[test]
    fn test_dropped_rows_keep_their_key() {
        let source = events();
        let mut frame = Frame::from_event_set(&source).unwrap();
        frame.rows.retain(|row| row.timestamp < 3.0);

        let back = frame.into_event_set(source.schema()).unwrap();
        let us = back.get(&IndexKey::from(vec![IndexValue::from("us")])).unwrap();
        assert!(us.is_empty());
        assert_eq!(us.features.len(), 2);
        assert_eq!(back.num_events(), 2);
    }
}
