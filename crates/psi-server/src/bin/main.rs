//! PSI rendezvous server CLI

use anyhow::Result;
use clap::Parser;
use psi_server::{init_prometheus_recorder, ServerBuilder, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,psi_server=debug".into()),
        )
        .init();

    let config = ServerConfig::parse();
    tracing::info!(
        addr = %config.listen_addr(),
        max_upload_bytes = config.max_upload_bytes,
        upload_timeout_secs = config.upload_timeout_secs,
        stale_after_secs = ?config.stale_after_secs,
        "PSI server starting"
    );

    let mut builder = ServerBuilder::new(config.clone());
    if !config.disable_metrics {
        builder = builder.metrics(init_prometheus_recorder()?);
    }

    builder.build().run().await
}
