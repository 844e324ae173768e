mod client;
mod commands;
mod config;
mod domain;
mod error;
mod render;
mod stream;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "komarictl",
    version,
    about = "CLI client for Komari-compatible server monitors"
)]
struct Cli {
    /// Monitor base URL (overrides config and KOMARI_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// API key or session token (overrides config and KOMARI_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor version and build hash
    Version,

    /// Static node inventory
    Nodes {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Render the report as an image
        #[arg(long)]
        image: bool,
    },

    /// Public site settings
    Public,

    /// Live telemetry snapshot (inventory + stream, reconciled)
    Realtime {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Render the report as an image
        #[arg(long)]
        image: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("komarictl=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = config::load_with_overrides(cli.url, cli.token)?;

    match cli.command {
        Commands::Version => commands::version::run(&config),
        Commands::Nodes { format, image } => commands::nodes::run(&config, &format, image),
        Commands::Public => commands::public::run(&config),
        Commands::Realtime { format, image } => commands::realtime::run(&config, &format, image),
    }
}
