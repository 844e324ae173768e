//! Metric normalization: raw telemetry groups into stable derived fields.
//!
//! Every derived field is additive — the raw groups stay in place so any
//! downstream formatter can use either. Each step is independently
//! skippable: an absent or malformed group never blocks the others.

use serde_json::{Map, Value};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Derive presentation fields for one reconciled record, in place.
pub fn normalize(record: &mut Map<String, Value>) {
    normalize_cpu(record);
    normalize_ram(record);
    normalize_disk(record);
    normalize_network(record);
    normalize_uptime(record);
    normalize_load(record);
}

fn normalize_cpu(record: &mut Map<String, Value>) {
    // Upstream reports an actual percentage already; no ×100 scaling.
    if let Some(usage) = record
        .get("cpu")
        .and_then(Value::as_object)
        .and_then(|cpu| cpu.get("usage"))
        .and_then(Value::as_f64)
    {
        record.insert("cpu_usage_percent".to_string(), Value::from(round2(usage)));
    }
}

fn normalize_ram(record: &mut Map<String, Value>) {
    normalize_capacity(record, "ram", "mem_total", "ram");
}

fn normalize_disk(record: &mut Map<String, Value>) {
    normalize_capacity(record, "disk", "disk_total", "disk");
}

/// Shared total/used/percent derivation for ram and disk.
///
/// The usage percentage is computed only from a live streaming total; a
/// backfilled flat total yields the GB figure alone. Intentional upstream
/// asymmetry, kept as-is.
fn normalize_capacity(record: &mut Map<String, Value>, group: &str, flat_total: &str, prefix: &str) {
    match record.get(group).and_then(Value::as_object).cloned() {
        Some(values) => {
            let total = values
                .get("total")
                .and_then(Value::as_f64)
                .filter(|t| *t > 0.0);
            if let Some(total) = total {
                let used = values.get("used").and_then(Value::as_f64).unwrap_or(0.0);
                record.insert(
                    format!("{prefix}_total_gb"),
                    Value::from(round2(total / GIB)),
                );
                record.insert(format!("{prefix}_used_gb"), Value::from(round2(used / GIB)));
                record.insert(
                    format!("{prefix}_usage_percent"),
                    Value::from(round1(used / total * 100.0)),
                );
            }
        }
        None => {
            if let Some(total) = record.get(flat_total).and_then(Value::as_f64) {
                record.insert(
                    format!("{prefix}_total_gb"),
                    Value::from(round2(total / GIB)),
                );
            }
        }
    }
}

fn normalize_network(record: &mut Map<String, Value>) {
    if let Some(network) = record.get("network").and_then(Value::as_object).cloned() {
        let rate = |key: &str| network.get(key).and_then(Value::as_f64).unwrap_or(0.0);

        record.insert(
            "net_up_str".to_string(),
            Value::String(fmt_speed(rate("up"))),
        );
        record.insert(
            "net_down_str".to_string(),
            Value::String(fmt_speed(rate("down"))),
        );
        record.insert(
            "traffic_up_str".to_string(),
            Value::String(fmt_traffic(rate("totalUp"))),
        );
        record.insert(
            "traffic_down_str".to_string(),
            Value::String(fmt_traffic(rate("totalDown"))),
        );
    }
}

fn normalize_uptime(record: &mut Map<String, Value>) {
    if let Some(secs) = record.get("uptime").and_then(Value::as_f64) {
        record.insert(
            "uptime_str".to_string(),
            Value::String(fmt_uptime(secs.max(0.0) as u64)),
        );
    }
}

fn normalize_load(record: &mut Map<String, Value>) {
    if let Some(load) = record.get("load").and_then(Value::as_object).cloned() {
        for (from, to) in [("load1", "load_1"), ("load5", "load_5"), ("load15", "load_15")] {
            record.insert(
                to.to_string(),
                load.get(from).cloned().unwrap_or(Value::Null),
            );
        }
    }
}

// ── Formatting helpers ─────────────────────────────────────

/// Instantaneous rate in bytes/s: MB/s above 1 MiB/s, KB/s below.
pub(crate) fn fmt_speed(bytes_per_sec: f64) -> String {
    if bytes_per_sec > MIB {
        format!("{:.1} MB/s", bytes_per_sec / MIB)
    } else {
        format!("{:.1} KB/s", bytes_per_sec / KIB)
    }
}

/// Cumulative traffic in bytes: GB above 1 GiB, MB below.
pub(crate) fn fmt_traffic(bytes: f64) -> String {
    if bytes > GIB {
        format!("{:.2} GB", bytes / GIB)
    } else {
        format!("{:.2} MB", bytes / MIB)
    }
}

pub(crate) fn fmt_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    format!("{days}天 {hours}小时")
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalized(value: serde_json::Value) -> Map<String, Value> {
        let mut record = value.as_object().unwrap().clone();
        normalize(&mut record);
        record
    }

    #[test]
    fn cpu_usage_is_rounded_not_scaled() {
        let rec = normalized(json!({"cpu": {"usage": 0.3754}}));
        assert_eq!(rec.get("cpu_usage_percent").unwrap(), &json!(0.38));
    }

    #[test]
    fn cpu_without_numeric_usage_is_skipped() {
        let rec = normalized(json!({"cpu": {"usage": "busy"}}));
        assert!(rec.get("cpu_usage_percent").is_none());
    }

    #[test]
    fn ram_derivation_from_streaming_totals() {
        // 8 GiB total, 4 GiB used.
        let rec = normalized(json!({"ram": {"total": 8589934592u64, "used": 4294967296u64}}));
        assert_eq!(rec.get("ram_total_gb").unwrap(), &json!(8.0));
        assert_eq!(rec.get("ram_used_gb").unwrap(), &json!(4.0));
        assert_eq!(rec.get("ram_usage_percent").unwrap(), &json!(50.0));
    }

    #[test]
    fn flat_mem_total_yields_total_only() {
        let rec = normalized(json!({"mem_total": 8589934592u64}));
        assert_eq!(rec.get("ram_total_gb").unwrap(), &json!(8.0));
        assert!(rec.get("ram_used_gb").is_none());
        assert!(rec.get("ram_usage_percent").is_none());
    }

    #[test]
    fn live_ram_group_shadows_flat_total() {
        // No percentage from a backfilled total, even when the live group is unusable.
        let rec = normalized(json!({"ram": {"total": 0}, "mem_total": 8589934592u64}));
        assert!(rec.get("ram_total_gb").is_none());
        assert!(rec.get("ram_usage_percent").is_none());
    }

    #[test]
    fn disk_follows_the_same_pattern() {
        let rec = normalized(json!({"disk": {"total": 107374182400u64, "used": 53687091200u64}}));
        assert_eq!(rec.get("disk_total_gb").unwrap(), &json!(100.0));
        assert_eq!(rec.get("disk_usage_percent").unwrap(), &json!(50.0));
    }

    #[test]
    fn network_speeds_scale_at_one_mib() {
        let rec = normalized(json!({"network": {"up": 2097152, "down": 51200}}));
        assert_eq!(rec.get("net_up_str").unwrap(), &json!("2.0 MB/s"));
        assert_eq!(rec.get("net_down_str").unwrap(), &json!("50.0 KB/s"));
        // Absent totals format as zero rather than being skipped.
        assert_eq!(rec.get("traffic_up_str").unwrap(), &json!("0.00 MB"));
    }

    #[test]
    fn cumulative_traffic_scales_at_one_gib() {
        let rec = normalized(json!({"network": {
            "totalUp": 3221225472u64,
            "totalDown": 524288000u64
        }}));
        assert_eq!(rec.get("traffic_up_str").unwrap(), &json!("3.00 GB"));
        assert_eq!(rec.get("traffic_down_str").unwrap(), &json!("500.00 MB"));
    }

    #[test]
    fn uptime_decomposes_into_days_and_hours() {
        let rec = normalized(json!({"uptime": 90000}));
        assert_eq!(rec.get("uptime_str").unwrap(), &json!("1天 1小时"));
    }

    #[test]
    fn load_values_pass_through_unchanged() {
        let rec = normalized(json!({"load": {"load1": 0.52, "load5": 0.61, "load15": 0.7}}));
        assert_eq!(rec.get("load_1").unwrap(), &json!(0.52));
        assert_eq!(rec.get("load_5").unwrap(), &json!(0.61));
        assert_eq!(rec.get("load_15").unwrap(), &json!(0.7));
    }

    #[test]
    fn malformed_groups_do_not_block_other_steps() {
        let rec = normalized(json!({
            "cpu": "not a mapping",
            "ram": [1, 2, 3],
            "uptime": 3600,
            "load": {"load1": 1.0}
        }));
        assert!(rec.get("cpu_usage_percent").is_none());
        assert!(rec.get("ram_total_gb").is_none());
        assert_eq!(rec.get("uptime_str").unwrap(), &json!("0天 1小时"));
        assert_eq!(rec.get("load_1").unwrap(), &json!(1.0));
    }

    #[test]
    fn raw_groups_survive_normalization() {
        let rec = normalized(json!({"ram": {"total": 1073741824u64, "used": 0}}));
        assert!(rec.get("ram").is_some());
    }
}
