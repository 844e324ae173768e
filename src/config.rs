use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::MonitorError;

/// Tool configuration, read from `~/.config/komarictl/config.toml`.
///
/// Precedence: CLI flags > environment (`KOMARI_URL`, `KOMARI_TOKEN`) > file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Monitor base URL, e.g. `https://status.example.com`.
    pub base_url: Option<String>,
    /// API key or session token. Sent as both a bearer header and a
    /// session cookie, since the backend accepts either.
    pub token: Option<String>,
    /// Send reports as rendered images instead of plain text.
    #[serde(default)]
    pub image_output: bool,
    /// Dark background for rendered images.
    #[serde(default = "default_dark_theme")]
    pub dark_theme: bool,
    /// HTML-to-image render service endpoint (required for image output).
    pub render_url: Option<String>,
}

fn default_dark_theme() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            image_output: false,
            dark_theme: default_dark_theme(),
            render_url: None,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("could not determine config directory")?;
        Ok(config_dir.join("komarictl").join("config.toml"))
    }

    /// The configured base URL with any trailing slash removed.
    /// Fails fast when nothing is configured; no network call is attempted.
    pub fn base_url(&self) -> Result<String, MonitorError> {
        match self.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url.trim_end_matches('/').to_string()),
            _ => Err(MonitorError::NotConfigured),
        }
    }
}

pub fn load() -> Result<Config> {
    let mut config = load_file(&Config::path()?)?;
    apply_env(
        &mut config,
        std::env::var("KOMARI_URL").ok(),
        std::env::var("KOMARI_TOKEN").ok(),
    );
    Ok(config)
}

fn load_file(path: &std::path::Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Load the file config, then layer CLI overrides on top.
pub fn load_with_overrides(url: Option<String>, token: Option<String>) -> Result<Config> {
    let mut config = load()?;
    if let Some(url) = url {
        config.base_url = Some(url);
    }
    if let Some(token) = token {
        config.token = Some(token);
    }
    Ok(config)
}

fn apply_env(config: &mut Config, url: Option<String>, token: Option<String>) {
    if let Some(url) = url.filter(|u| !u.is_empty()) {
        config.base_url = Some(url);
    }
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        config.token = Some(token);
    }
}
