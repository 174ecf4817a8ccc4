//! Edge access gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 EDGE GATEWAY                 │
//!     Client Request      │  ┌──────────┐   ┌───────────┐   ┌─────────┐  │
//!     ────────────────────┼─▶│request id│──▶│ assertion │──▶│  relay  │──┼──▶ Backend
//!                         │  │ + trace  │   │   gate    │   │ handler │  │    query
//!                         │  └──────────┘   └─────┬─────┘   └────┬────┘  │    service
//!                         │                       │ 401          │       │
//!     Client Response     │                       ▼              ▼       │
//!     ◀───────────────────┼───────────────────────────────── response ◀──┼─── (verbatim)
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_gateway::config::{load_config, ConfigOverrides};
use edge_gateway::lifecycle::startup;
use edge_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "Identity-assertion gateway in front of the query backend", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "EDGE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the file and BACKEND_URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Listener address, overrides the file and EDGE_GATEWAY_BIND
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        backend_url: cli.backend_url,
        bind_address: cli.bind,
    };
    let config = match load_config(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("STARTUP_ERROR {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&config.observability);
    tracing::info!("edge-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
