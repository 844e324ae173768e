//! `komarictl nodes` — static node inventory report.

use anyhow::Result;
use tracing::warn;

use crate::client::MonitorClient;
use crate::commands::render_image;
use crate::config::Config;
use crate::render;
use crate::render::image::STATUS_TEMPLATE;

pub fn run(config: &Config, format: &str, image: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(config, format, image))
}

async fn run_async(config: &Config, format: &str, image: bool) -> Result<()> {
    let client = MonitorClient::from_config(config)?;
    let nodes = client.nodes().await?;

    if nodes.is_empty() {
        println!("No nodes found.");
        return Ok(());
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    if image || config.image_output {
        match render_image(config, &nodes, None, STATUS_TEMPLATE).await {
            Ok(url) => {
                println!("{url}");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "image rendering failed, falling back to text");
            }
        }
    }

    println!("{}", render::nodes_text(&nodes));
    Ok(())
}
