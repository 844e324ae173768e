//! Streaming payload shape classification and record extraction.
//!
//! The monitor's stream payload is not a stable shape. Depending on backend
//! version it may be a flat list of records, an `online`/`data` pair, a
//! mapping with a conventional list field, or a plain id→record mapping.
//! Classification is an explicit priority-ordered step producing one uniform
//! output: an ordered sequence of per-node record mappings, plus a count of
//! elements dropped as malformed.

use serde_json::{Map, Value};

use crate::domain::key_string;
use crate::error::MonitorError;

/// Conventional list fields, checked in this fixed order; first match wins.
const LIST_KEYS: [&str; 5] = ["servers", "nodes", "clients", "list", "data"];

/// The structural forms a decoded payload may take.
#[derive(Debug)]
enum Shape {
    /// `{online: [id, ...], data: {id: record, ...}}` — order follows the
    /// online list; each emitted record carries its identifier as `uuid`.
    OnlinePair {
        online: Vec<Value>,
        detail: Map<String, Value>,
    },
    /// Mapping with a conventional list-valued key.
    KeyedList(Vec<Value>),
    /// Mapping of id → record, no conventional list key.
    IdMap(Vec<Value>),
    /// Already a list of records.
    Flat(Vec<Value>),
}

fn classify(payload: &Value) -> Result<Shape, MonitorError> {
    if let Value::Object(map) = payload {
        if let (Some(Value::Array(online)), Some(Value::Object(detail))) =
            (map.get("online"), map.get("data"))
        {
            return Ok(Shape::OnlinePair {
                online: online.clone(),
                detail: detail.clone(),
            });
        }

        for key in LIST_KEYS {
            if let Some(Value::Array(list)) = map.get(key) {
                return Ok(Shape::KeyedList(list.clone()));
            }
        }

        let candidates: Vec<Value> = map
            .values()
            .filter(|v| v.is_object())
            .cloned()
            .collect();
        if !candidates.is_empty() {
            return Ok(Shape::IdMap(candidates));
        }

        return Err(MonitorError::UnrecognizedShape {
            keys: map.keys().cloned().collect(),
        });
    }

    if let Value::Array(list) = payload {
        return Ok(Shape::Flat(list.clone()));
    }

    Err(MonitorError::UnrecognizedShape { keys: Vec::new() })
}

/// Extraction result: valid records in payload order, plus how many
/// elements were dropped as malformed along the way.
#[derive(Debug)]
pub struct Extraction {
    pub records: Vec<Map<String, Value>>,
    pub dropped: usize,
}

/// Classify the payload and extract its per-node records.
///
/// Individual elements may be JSON-encoded strings (decoded in place) or
/// outright malformed (dropped and counted); neither aborts the rest.
pub fn extract_records(payload: &Value) -> Result<Extraction, MonitorError> {
    let elements: Vec<(Option<String>, Value)> = match classify(payload)? {
        Shape::OnlinePair { online, detail } => online
            .iter()
            .filter_map(key_string)
            .filter_map(|id| {
                detail
                    .get(&id)
                    .cloned()
                    .map(|record| (Some(id), record))
            })
            .collect(),
        Shape::KeyedList(list) | Shape::IdMap(list) | Shape::Flat(list) => {
            list.into_iter().map(|v| (None, v)).collect()
        }
    };

    let mut records = Vec::with_capacity(elements.len());
    let mut dropped = 0;
    for (uuid, element) in elements {
        match coerce_record(element) {
            Some(mut record) => {
                if let Some(uuid) = uuid {
                    record.insert("uuid".to_string(), Value::String(uuid));
                }
                records.push(record);
            }
            None => dropped += 1,
        }
    }

    Ok(Extraction { records, dropped })
}

/// A record must end up as a mapping; strings get one nested decode attempt.
fn coerce_record(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}
