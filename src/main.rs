//! hive-bridge
//!
//! Exposes TheHive case-management operations as request/response services.
//!
//! # Architecture Overview
//!
//! ```text
//!   Requester                 ┌──────────────────────────────────────────────┐
//!   (HTTP ingress or          │                 HIVE BRIDGE                  │
//!    in-process fabric)       │                                              │
//!   ─────────────────────────▶│  ┌────────┐   ┌─────────┐   ┌────────────┐  │
//!        topic + JSON         │  │ fabric │──▶│ service │──▶│  upstream  │──┼──▶ TheHive
//!                             │  │ topics │   │ handler │   │   client   │  │    REST API
//!   ◀─────────────────────────│  └────────┘   └─────────┘   └────────────┘  │
//!     success or error reply  │                                              │
//!                             │  config · observability · lifecycle          │
//!                             └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use hive_bridge::config::load_config;
use hive_bridge::lifecycle::{wait_for_signal, Application, Shutdown};
use hive_bridge::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "hive-bridge")]
#[command(about = "Serve TheHive operations over a request/response fabric", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config/hive-bridge.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        host = %config.general.host,
        api_names = ?config.general.api_names,
        "hive-bridge starting"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let app = Application::build(config)?;
    for topic in app.topics() {
        tracing::info!(topic = %topic, "Serving topic");
    }

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        tracing::info!(signal, "Shutdown signal received");
        trigger.trigger();
    });

    app.run(shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
