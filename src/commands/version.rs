//! `komarictl version` — monitor version and build hash.

use anyhow::Result;

use crate::client::MonitorClient;
use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(config))
}

async fn run_async(config: &Config) -> Result<()> {
    let client = MonitorClient::from_config(config)?;
    let info = client.version().await?;

    println!(
        "Komari version: {} ({})",
        info.version.as_deref().unwrap_or("unknown"),
        info.hash.as_deref().unwrap_or("unknown")
    );
    Ok(())
}
