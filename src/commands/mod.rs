pub mod nodes;
pub mod public;
pub mod realtime;
pub mod version;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::render;
use crate::render::image::RenderClient;

/// Render records through the external image service. Callers fall back to
/// the text report when this fails.
pub(crate) async fn render_image(
    config: &Config,
    records: &[Map<String, Value>],
    title: Option<&str>,
    template: &str,
) -> Result<String> {
    let url = config
        .render_url
        .as_deref()
        .context("render_url is not configured")?;
    let payload = render::render_payload(records, title, config.dark_theme);
    RenderClient::new(url).render(template, &payload).await
}
