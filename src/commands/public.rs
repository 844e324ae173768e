//! `komarictl public` — the monitor's public site settings.

use anyhow::Result;

use crate::client::MonitorClient;
use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_async(config))
}

async fn run_async(config: &Config) -> Result<()> {
    let client = MonitorClient::from_config(config)?;
    let settings = client.public().await?;

    println!("Site:        {}", settings.sitename.as_deref().unwrap_or("unknown"));
    println!("Description: {}", settings.description.as_deref().unwrap_or(""));
    println!("Theme:       {}", settings.theme.as_deref().unwrap_or("default"));
    Ok(())
}
