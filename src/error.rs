//! Error taxonomy for monitor interactions.
//!
//! Every failure class the monitor can produce maps to one variant here, and
//! all of them are turned into a user-facing message at the command boundary.
//! Per-record failures inside a telemetry payload are not errors at all: those
//! elements are dropped and counted, and only a fully empty result surfaces
//! as [`MonitorError::NoData`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// No base URL configured. Checked before any network call.
    #[error("monitor base URL is not configured (set base_url in config.toml or KOMARI_URL)")]
    NotConfigured,

    /// DNS, TLS, timeout, refused connection — on REST or stream.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The monitor answered, but with a non-200 status.
    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u16 },

    /// Decoded body carried `status != "success"`.
    #[error("monitor API error: {message}")]
    Api { message: String },

    /// Streaming payload did not match any known shape.
    #[error("telemetry payload format not recognized (keys: {})", keys.join(", "))]
    UnrecognizedShape { keys: Vec<String> },

    /// Stream yielded no usable payload, or every record was dropped.
    #[error("no telemetry data received from the monitor; check the service status")]
    NoData,
}

impl MonitorError {
    pub fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
