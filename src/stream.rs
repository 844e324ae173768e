//! WebSocket session against the monitor's streaming endpoint.
//!
//! One session per invocation: connect, send a single `"get"` pull command,
//! then scan a bounded number of incoming frames for a successful payload.
//! The connection is closed on every exit path.

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

use crate::client::{bearer_value, cookie_value};
use crate::error::MonitorError;

/// The single literal command the monitor expects on connect.
const PULL_COMMAND: &str = "get";
/// Frames to scan before giving up on a payload.
const MAX_FRAMES: usize = 3;
const STREAM_PATH: &str = "/api/clients";

/// Derive the stream endpoint from the REST base URL by swapping the
/// scheme (`https` → `wss`, `http` → `ws`) and appending the fixed path.
pub fn stream_endpoint(base_url: &str) -> Result<Url, MonitorError> {
    let mut url = Url::parse(base_url.trim_end_matches('/'))
        .map_err(|e| MonitorError::transport(base_url, &e))?;

    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(MonitorError::transport(
                base_url,
                format!("unsupported URL scheme '{other}'"),
            ))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| MonitorError::transport(base_url, "could not derive stream scheme"))?;
    url.set_path(&format!(
        "{}{}",
        url.path().trim_end_matches('/'),
        STREAM_PATH
    ));
    Ok(url)
}

/// What a single received frame means for the scan loop.
pub(crate) enum FrameOutcome {
    /// A decoded mapping with `status == "success"`; carries its `data` field.
    Payload(Value),
    /// Not a payload (binary frame, undecodable text, non-success status).
    Skip,
    /// Close frame; no payload will follow.
    Terminal,
}

pub(crate) fn scan_frame(msg: &Message) -> FrameOutcome {
    match msg {
        Message::Text(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(obj))
                if obj.get("status").and_then(Value::as_str) == Some("success") =>
            {
                FrameOutcome::Payload(
                    obj.get("data")
                        .cloned()
                        .unwrap_or_else(|| Value::Object(Default::default())),
                )
            }
            _ => FrameOutcome::Skip,
        },
        Message::Close(_) => FrameOutcome::Terminal,
        _ => FrameOutcome::Skip,
    }
}

/// Open the stream, pull once, and scan up to [`MAX_FRAMES`] frames for a
/// successful payload. Connection failures surface as transport errors,
/// distinct from a connected-but-empty session ([`MonitorError::NoData`]).
pub async fn fetch_payload(base_url: &str, token: Option<&str>) -> Result<Value, MonitorError> {
    let endpoint = stream_endpoint(base_url)?;

    let mut request = endpoint
        .as_str()
        .into_client_request()
        .map_err(|e| MonitorError::transport(endpoint.as_str(), &e))?;
    if let Some(token) = token {
        let headers = request.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&bearer_value(token)) {
            headers.insert("Authorization", value);
        }
        if let Ok(value) = HeaderValue::from_str(&cookie_value(token)) {
            headers.insert("Cookie", value);
        }
    }

    let (mut ws, _) = connect_async(request)
        .await
        .map_err(|e| MonitorError::transport(endpoint.as_str(), &e))?;
    debug!(endpoint = %endpoint, "stream connected");

    if let Err(e) = ws.send(Message::Text(PULL_COMMAND.into())).await {
        let _ = ws.close(None).await;
        return Err(MonitorError::transport(endpoint.as_str(), &e));
    }

    let mut payload = None;
    for attempt in 0..MAX_FRAMES {
        match ws.next().await {
            Some(Ok(msg)) => match scan_frame(&msg) {
                FrameOutcome::Payload(data) => {
                    payload = Some(data);
                    break;
                }
                FrameOutcome::Skip => {
                    debug!(attempt, "frame did not carry a telemetry payload");
                }
                FrameOutcome::Terminal => {
                    debug!(attempt, "stream closed before a payload arrived");
                    break;
                }
            },
            Some(Err(e)) => {
                debug!(attempt, error = %e, "stream error before a payload arrived");
                break;
            }
            None => break,
        }
    }

    // Session released whether or not a payload was found.
    let _ = ws.close(None).await;

    payload.ok_or(MonitorError::NoData)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derives_wss_from_https() {
        let url = stream_endpoint("https://status.example.com").unwrap();
        assert_eq!(url.as_str(), "wss://status.example.com/api/clients");
    }

    #[test]
    fn derives_ws_from_http_and_trims_slash() {
        let url = stream_endpoint("http://10.0.0.1:8080/").unwrap();
        assert_eq!(url.as_str(), "ws://10.0.0.1:8080/api/clients");
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(stream_endpoint("ftp://status.example.com").is_err());
    }

    #[test]
    fn success_frame_yields_payload() {
        let msg = Message::Text(json!({"status": "success", "data": {"nodes": []}}).to_string());
        match scan_frame(&msg) {
            FrameOutcome::Payload(data) => assert_eq!(data, json!({"nodes": []})),
            _ => panic!("expected payload"),
        }
    }

    #[test]
    fn success_frame_without_data_yields_empty_mapping() {
        let msg = Message::Text(json!({"status": "success"}).to_string());
        match scan_frame(&msg) {
            FrameOutcome::Payload(data) => assert_eq!(data, json!({})),
            _ => panic!("expected payload"),
        }
    }

    #[test]
    fn non_success_and_garbage_frames_are_skipped() {
        assert!(matches!(
            scan_frame(&Message::Text(json!({"status": "error"}).to_string())),
            FrameOutcome::Skip
        ));
        assert!(matches!(
            scan_frame(&Message::Text("not json".to_string())),
            FrameOutcome::Skip
        ));
        assert!(matches!(
            scan_frame(&Message::Binary(vec![1, 2, 3])),
            FrameOutcome::Skip
        ));
    }

    #[test]
    fn close_frame_is_terminal() {
        assert!(matches!(
            scan_frame(&Message::Close(None)),
            FrameOutcome::Terminal
        ));
    }
}
