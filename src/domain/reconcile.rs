//! Backfill merge of streamed records against the static inventory.

use serde_json::{Map, Value};

use crate::domain::inventory::Inventory;
use crate::domain::key_string;

/// Name used when neither the stream nor the inventory provides one.
pub const NAME_PLACEHOLDER: &str = "unknown node";

/// Some agents report this literal instead of omitting the name.
const NAME_UNKNOWN_SENTINEL: &str = "Unknown";

/// The key used to correlate a streamed record with the inventory:
/// `uuid` when present, else `id`.
pub fn identity_key(record: &Map<String, Value>) -> Option<String> {
    record
        .get("uuid")
        .and_then(key_string)
        .or_else(|| record.get("id").and_then(key_string))
}

/// Pure merge: returns a new record with every field that is absent or null
/// in `raw` filled from the matching static record. Raw values win whenever
/// they are present and non-null. The result always carries a non-empty
/// `name`.
pub fn merge(raw: &Map<String, Value>, inventory: &Inventory) -> Map<String, Value> {
    let mut merged = raw.clone();

    let static_record = identity_key(raw).and_then(|key| inventory.lookup(&key));

    if let Some(static_record) = static_record {
        for (field, value) in static_record {
            let missing = match merged.get(field) {
                None | Some(Value::Null) => true,
                Some(_) => false,
            };
            if missing {
                merged.insert(field.clone(), value.clone());
            }
        }
    }

    merged.insert(
        "name".to_string(),
        Value::String(resolve_name(raw, static_record)),
    );
    merged
}

fn resolve_name(raw: &Map<String, Value>, static_record: Option<&Map<String, Value>>) -> String {
    let raw_name = raw
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty() && *n != NAME_UNKNOWN_SENTINEL);

    raw_name
        .map(str::to_string)
        .or_else(|| {
            static_record
                .and_then(|s| s.get("name"))
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| NAME_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn inventory_of(nodes: serde_json::Value) -> Inventory {
        let nodes: Vec<Map<String, Value>> = nodes
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        Inventory::from_nodes(&nodes)
    }

    #[test]
    fn uuid_takes_priority_over_id() {
        let raw = record(json!({"uuid": "u-1", "id": "n-9"}));
        assert_eq!(identity_key(&raw).as_deref(), Some("u-1"));
    }

    #[test]
    fn absent_and_null_fields_are_backfilled() {
        let inv = inventory_of(json!([
            {"id": "n1", "os": "Debian 12", "region": "EU", "cpu_cores": 4}
        ]));
        let raw = record(json!({"id": "n1", "os": null, "cpu_cores": 8}));

        let merged = merge(&raw, &inv);
        assert_eq!(merged.get("os").unwrap(), &json!("Debian 12"));
        assert_eq!(merged.get("region").unwrap(), &json!("EU"));
        // Present raw values always win.
        assert_eq!(merged.get("cpu_cores").unwrap(), &json!(8));
    }

    #[test]
    fn missing_name_falls_back_to_static_name() {
        let inv = inventory_of(json!([{"id": "n1", "name": "Box1"}]));
        let raw = record(json!({"id": "n1"}));
        assert_eq!(merge(&raw, &inv).get("name").unwrap(), &json!("Box1"));
    }

    #[test]
    fn unknown_sentinel_name_is_replaced() {
        let inv = inventory_of(json!([{"id": "n1", "name": "Box1"}]));
        let raw = record(json!({"id": "n1", "name": "Unknown"}));
        assert_eq!(merge(&raw, &inv).get("name").unwrap(), &json!("Box1"));
    }

    #[test]
    fn real_raw_name_is_kept() {
        let inv = inventory_of(json!([{"id": "n1", "name": "Box1"}]));
        let raw = record(json!({"id": "n1", "name": "agent-name"}));
        assert_eq!(merge(&raw, &inv).get("name").unwrap(), &json!("agent-name"));
    }

    #[test]
    fn unmatched_record_gets_placeholder_name() {
        let raw = record(json!({"id": "nobody-knows-me"}));
        let merged = merge(&raw, &Inventory::empty());
        assert_eq!(merged.get("name").unwrap(), &json!(NAME_PLACEHOLDER));
    }

    #[test]
    fn keyless_record_is_passed_through_with_placeholder() {
        let inv = inventory_of(json!([{"id": "n1", "region": "EU"}]));
        let raw = record(json!({"cpu": {"usage": 5.0}}));

        let merged = merge(&raw, &inv);
        assert!(merged.get("region").is_none());
        assert_eq!(merged.get("name").unwrap(), &json!(NAME_PLACEHOLDER));
    }
}
