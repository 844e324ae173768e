//! Turning reconciled, normalized records into user-facing output:
//! a plain-text report, or a structured payload for the render service.

pub mod image;

use colored::Colorize;
use serde_json::{json, Map, Value};

pub const REALTIME_TITLE: &str = "Komari realtime status";

fn field<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| !v.is_null())
}

fn text<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    field(record, key).and_then(Value::as_str)
}

fn number(record: &Map<String, Value>, key: &str) -> Option<f64> {
    field(record, key).and_then(Value::as_f64)
}

/// Plain-text realtime report, one block per node, in payload order.
pub fn realtime_text(records: &[Map<String, Value>]) -> String {
    let mut out = vec![format!("📊 {}", REALTIME_TITLE.bold())];

    for record in records {
        let name = text(record, "name").unwrap_or("unknown node");
        let region = text(record, "region").unwrap_or("");
        if region.is_empty() {
            out.push(format!("\n📌 {name}"));
        } else {
            out.push(format!("\n📌 {region} {name}"));
        }

        if let Some(os) = text(record, "os") {
            out.push(format!("   OS:      {os}"));
        }
        if let Some(cpu) = number(record, "cpu_usage_percent") {
            out.push(format!("   CPU:     {cpu}%"));
        }
        out.extend(capacity_line(record, "ram", "RAM: "));
        out.extend(capacity_line(record, "disk", "Disk:"));
        if let (Some(up), Some(down)) = (text(record, "net_up_str"), text(record, "net_down_str")) {
            out.push(format!("   Net:     ↑ {up}  ↓ {down}"));
        }
        if let (Some(up), Some(down)) = (
            text(record, "traffic_up_str"),
            text(record, "traffic_down_str"),
        ) {
            out.push(format!("   Traffic: ↑ {up}  ↓ {down}"));
        }
        if let Some(uptime) = text(record, "uptime_str") {
            out.push(format!("   Uptime:  {uptime}"));
        }
        if let (Some(l1), Some(l5), Some(l15)) = (
            number(record, "load_1"),
            number(record, "load_5"),
            number(record, "load_15"),
        ) {
            out.push(format!("   Load:    {l1} / {l5} / {l15}"));
        }
    }

    out.join("\n")
}

fn capacity_line(record: &Map<String, Value>, prefix: &str, label: &str) -> Option<String> {
    let total = number(record, &format!("{prefix}_total_gb"))?;
    match (
        number(record, &format!("{prefix}_used_gb")),
        number(record, &format!("{prefix}_usage_percent")),
    ) {
        (Some(used), Some(percent)) => Some(format!(
            "   {label}    {used:.2} / {total:.2} GB ({percent}%)"
        )),
        _ => Some(format!("   {label}    {total:.2} GB")),
    }
}

/// Plain-text static inventory report.
pub fn nodes_text(nodes: &[Map<String, Value>]) -> String {
    let mut out = vec![format!("🖥️ {}", "Komari node inventory".bold())];

    for node in nodes {
        let name = text(node, "name").unwrap_or("unknown node");
        let region = text(node, "region").unwrap_or("");
        if region.is_empty() {
            out.push(format!("\n📌 {name}"));
        } else {
            out.push(format!("\n📌 {region} {name}"));
        }

        out.push(format!("   OS:     {}", text(node, "os").unwrap_or("unknown")));
        out.push(format!(
            "   CPU:    {} ({} C)",
            text(node, "cpu_name").unwrap_or("unknown"),
            number(node, "cpu_cores")
                .map(|c| (c as u64).to_string())
                .unwrap_or_else(|| "?".to_string())
        ));
        out.push(format!(
            "   RAM:    {:.2} GB",
            number(node, "mem_total").unwrap_or(0.0) / 1024.0 / 1024.0 / 1024.0
        ));
        out.push(format!(
            "   Disk:   {:.2} GB",
            number(node, "disk_total").unwrap_or(0.0) / 1024.0 / 1024.0 / 1024.0
        ));
        if let Some(updated) = text(node, "updated_at") {
            out.push(format!("   Update: {}", fmt_timestamp(updated)));
        }
    }

    out.join("\n")
}

/// ISO 8601 from the API, flattened for display. Unparsable values are
/// shown as-is rather than dropped.
fn fmt_timestamp(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Structured payload for the HTML-to-image render collaborator.
pub fn render_payload(records: &[Map<String, Value>], title: Option<&str>, dark_theme: bool) -> Value {
    let mut payload = json!({
        "nodes": records,
        "dark_theme": dark_theme,
    });
    if let Some(title) = title {
        payload["title"] = Value::String(title.to_string());
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn realtime_text_lists_nodes_in_order() {
        let records = vec![
            record(json!({"name": "alpha", "region": "EU"})),
            record(json!({"name": "beta"})),
        ];
        let text = realtime_text(&records);
        let alpha = text.find("EU alpha").unwrap();
        let beta = text.find("beta").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn realtime_text_skips_absent_metrics() {
        let records = vec![record(json!({"name": "bare"}))];
        let text = realtime_text(&records);
        assert!(text.contains("bare"));
        assert!(!text.contains("RAM:"));
        assert!(!text.contains("Load:"));
    }

    #[test]
    fn realtime_text_formats_capacity_with_percent() {
        let records = vec![record(json!({
            "name": "n",
            "ram_total_gb": 8.0,
            "ram_used_gb": 4.0,
            "ram_usage_percent": 50.0
        }))];
        let text = realtime_text(&records);
        assert!(text.contains("4.00 / 8.00 GB (50%)") || text.contains("4.00 / 8.00 GB (50.0%)"));
    }

    #[test]
    fn nodes_text_converts_byte_totals() {
        let nodes = vec![record(json!({
            "name": "Box1",
            "os": "Debian 12",
            "cpu_name": "EPYC 7302",
            "cpu_cores": 16,
            "mem_total": 8589934592u64,
            "disk_total": 107374182400u64,
            "updated_at": "2026-01-23T12:04:33Z"
        }))];
        let text = nodes_text(&nodes);
        assert!(text.contains("8.00 GB"));
        assert!(text.contains("100.00 GB"));
        assert!(text.contains("2026-01-23 12:04:33"));
        assert!(text.contains("EPYC 7302 (16 C)"));
    }

    #[test]
    fn unparsable_timestamps_are_shown_raw() {
        assert_eq!(fmt_timestamp("soon-ish"), "soon-ish");
        assert_eq!(fmt_timestamp("2026-01-23T12:04:33Z"), "2026-01-23 12:04:33");
    }

    #[test]
    fn render_payload_carries_theme_and_title() {
        let records = vec![record(json!({"name": "n"}))];
        let payload = render_payload(&records, Some(REALTIME_TITLE), true);
        assert_eq!(payload["dark_theme"], json!(true));
        assert_eq!(payload["title"], json!(REALTIME_TITLE));
        assert_eq!(payload["nodes"].as_array().unwrap().len(), 1);

        let untitled = render_payload(&records, None, false);
        assert!(untitled.get("title").is_none());
    }
}
