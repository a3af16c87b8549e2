//! Flowsight server module
//!
//! Serves the single-page dashboard and its JSON API. All artifacts and the
//! dataset are loaded once at startup; a load failure is fatal.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::{AppState, Evaluation};

use crate::data::FlowDataset;
use crate::model::Artifacts;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: String,
    pub encoder_path: String,
    pub dataset_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            model_path: std::env::var("MODEL_PATH").unwrap_or_else(|_| "model.json".to_string()),
            encoder_path: std::env::var("ENCODER_PATH")
                .unwrap_or_else(|_| "label_encoder.json".to_string()),
            dataset_path: std::env::var("DATASET_PATH").unwrap_or_else(|_| "log2.csv".to_string()),
        }
    }
}

/// Load the artifacts and dataset, then serve until shutdown.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        model_path = %config.model_path,
        encoder_path = %config.encoder_path,
        dataset_path = %config.dataset_path,
        started_at = %start_time.to_rfc3339(),
        "Loading artifacts and dataset"
    );

    let artifacts = Artifacts::load(&config.model_path, &config.encoder_path)?;
    let dataset = FlowDataset::load(&config.dataset_path, &artifacts.encoder)?;

    let state = Arc::new(AppState::new(config.clone(), artifacts, dataset));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        "Flowsight dashboard starting"
    );
    info!(url = %format!("http://{}", addr), "Dashboard available");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let start_time_for_shutdown = start_time;
    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time_for_shutdown);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    info!("Server started successfully (press ctrl+c to stop)");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.model_path, "model.json");
        assert_eq!(config.encoder_path, "label_encoder.json");
        assert_eq!(config.dataset_path, "log2.csv");
    }
}
