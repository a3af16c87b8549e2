//! Flowsight - Main Entry Point
//!
//! Starts the dashboard server after loading the classifier, label encoder,
//! and dataset. Any load failure is fatal: the process logs and exits.

use clap::Parser;
use flowsight::server::{run_server, ServerConfig};

/// Network flow action dashboard
#[derive(Parser, Debug)]
#[command(name = "flowsight", version, about)]
struct Cli {
    /// Host to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(long)]
    port: Option<u16>,

    /// Path to the classifier artifact (JSON)
    #[arg(long)]
    model: Option<String>,

    /// Path to the label encoder artifact (JSON)
    #[arg(long)]
    encoder: Option<String>,

    /// Path to the dataset CSV
    #[arg(long)]
    data: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowsight=info".into()),
        )
        .init();

    let cli = Cli::parse();

    // CLI flags override env-derived defaults
    let mut config = ServerConfig::default();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    if let Some(encoder) = cli.encoder {
        config.encoder_path = encoder;
    }
    if let Some(data) = cli.data {
        config.dataset_path = data;
    }

    run_server(config).await
}
