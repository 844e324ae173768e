//! Typed HTTP client for the monitor's REST API.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::MonitorError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `GET /api/version` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

/// `GET /api/public` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicSettings {
    #[serde(default)]
    pub sitename: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

pub struct MonitorClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl MonitorClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
            http,
        })
    }

    /// Build a client from config, failing fast when no base URL is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.base_url()?;
        Self::new(&base_url, config.token.as_deref())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn version(&self) -> Result<VersionInfo, MonitorError> {
        let body = self.get_json("/api/version").await?;
        Ok(serde_json::from_value(data_field(&body)).unwrap_or_default())
    }

    pub async fn public(&self) -> Result<PublicSettings, MonitorError> {
        let body = self.get_json("/api/public").await?;
        Ok(serde_json::from_value(data_field(&body)).unwrap_or_default())
    }

    /// Static node inventory: `GET /api/nodes`, with the envelope's
    /// `status` checked and the `data` list extracted.
    pub async fn nodes(&self) -> Result<Vec<Map<String, Value>>, MonitorError> {
        let body = self.get_json("/api/nodes").await?;

        if body.get("status").and_then(Value::as_str) != Some("success") {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(MonitorError::Api { message });
        }

        let nodes = match body.get("data") {
            Some(Value::Array(list)) => list
                .iter()
                .filter_map(|v| v.as_object().cloned())
                .collect(),
            _ => Vec::new(),
        };
        Ok(nodes)
    }

    // ── Internal helpers ───────────────────────────────────

    async fn get_json(&self, path: &str) -> Result<Value, MonitorError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request
                .header("Authorization", bearer_value(token))
                .header("Cookie", cookie_value(token));
        }

        let resp = request
            .send()
            .await
            .map_err(|e| MonitorError::transport(&url, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MonitorError::Http {
                url,
                status: status.as_u16(),
            });
        }

        resp.json()
            .await
            .map_err(|e| MonitorError::transport(&url, &e))
    }
}

/// The backend accepts either header, so both are always sent.
pub(crate) fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

pub(crate) fn cookie_value(token: &str) -> String {
    format!("session_token={token}")
}

fn data_field(body: &Value) -> Value {
    body.get("data").cloned().unwrap_or(Value::Null)
}
