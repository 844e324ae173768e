//! Client for the external HTML-to-image render service.
//!
//! The service takes an HTML template plus a structured data payload and
//! returns a URL to the rendered image. Rendering is a collaborator, not
//! core logic: any failure here falls back to the text report.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Template for the static inventory report.
pub const STATUS_TEMPLATE: &str = include_str!("../../resources/status.html");
/// Template for the realtime telemetry report.
pub const REALTIME_TEMPLATE: &str = include_str!("../../resources/realtime.html");

#[derive(Serialize)]
struct RenderRequest<'a> {
    template: &'a str,
    data: &'a Value,
    options: RenderOptions,
}

/// Fixed render options matching what the render service expects.
#[derive(Serialize)]
pub struct RenderOptions {
    #[serde(rename = "type")]
    image_type: &'static str,
    quality: u8,
    full_page: bool,
    omit_background: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            image_type: "jpeg",
            quality: 92,
            full_page: true,
            omit_background: false,
        }
    }
}

#[derive(Deserialize)]
struct RenderResponse {
    #[serde(default)]
    url: Option<String>,
}

pub struct RenderClient {
    http: reqwest::Client,
    url: String,
}

impl RenderClient {
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    /// Render `data` through `template`; returns the image URL.
    pub async fn render(&self, template: &str, data: &Value) -> Result<String> {
        let request = RenderRequest {
            template,
            data,
            options: RenderOptions::default(),
        };

        let resp: RenderResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .context("sending render request")?
            .error_for_status()
            .context("render service returned error status")?
            .json()
            .await
            .context("parsing render service response")?;

        match resp.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => bail!("render service returned no image URL"),
        }
    }
}
