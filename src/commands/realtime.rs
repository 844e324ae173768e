//! `komarictl realtime` — live telemetry snapshot.
//!
//! One invocation is one bounded operation: fetch the static inventory
//! (best effort), pull a single payload from the stream, extract and
//! reconcile the records, derive presentation metrics, and render. No
//! retries, no state across invocations.

use anyhow::Result;
use tracing::{debug, warn};

use crate::client::MonitorClient;
use crate::commands::render_image;
use crate::config::Config;
use crate::domain::payload::Extraction;
use crate::domain::{inventory, metrics, payload, reconcile};
use crate::error::MonitorError;
use crate::render;
use crate::render::image::REALTIME_TEMPLATE;
use crate::stream;

pub fn run(config: &Config, format: &str, image: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(config, format, image))
}

async fn run_async(config: &Config, format: &str, image: bool) -> Result<()> {
    let client = MonitorClient::from_config(config)?;

    // Static inventory first: it feeds the backfill. Its failure is
    // non-fatal and already logged inside fetch.
    let inventory = inventory::fetch(&client).await;
    debug!(nodes = inventory.node_count(), "static inventory loaded");

    let data = stream::fetch_payload(client.base_url(), client.token()).await?;

    let Extraction { records, dropped } = payload::extract_records(&data)?;
    if dropped > 0 {
        warn!(dropped, "dropped malformed telemetry records");
    }

    let mut nodes = Vec::with_capacity(records.len());
    for raw in &records {
        let mut record = reconcile::merge(raw, &inventory);
        metrics::normalize(&mut record);
        nodes.push(record);
    }

    if nodes.is_empty() {
        return Err(MonitorError::NoData.into());
    }

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }

    if image || config.image_output {
        match render_image(config, &nodes, Some(render::REALTIME_TITLE), REALTIME_TEMPLATE).await {
            Ok(url) => {
                println!("{url}");
                return Ok(());
            }
            Err(e) => {
                warn!(error = %e, "image rendering failed, falling back to text");
            }
        }
    }

    println!("{}", render::realtime_text(&nodes));
    Ok(())
}
