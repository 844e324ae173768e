//! Telemetry reconciliation pipeline: static inventory, streamed payload
//! extraction, raw/static backfill, and metric normalization.

pub mod inventory;
pub mod metrics;
pub mod payload;
pub mod reconcile;

use serde_json::Value;

/// Best-effort string form of an identity key (`id` or `uuid`). The backend
/// emits both strings and numbers here depending on version.
pub(crate) fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
