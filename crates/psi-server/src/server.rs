//! Server assembly and lifecycle

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use psi_core::RendezvousCoordinator;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::routes::create_router;
use crate::state::{create_shared_state, SharedState};

/// Builder for [`PsiServer`]
pub struct ServerBuilder {
    config: ServerConfig,
    coordinator: Option<RendezvousCoordinator>,
    metrics: Option<PrometheusHandle>,
}

impl ServerBuilder {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            coordinator: None,
            metrics: None,
        }
    }

    /// Use an existing coordinator instead of building one from the config
    pub fn coordinator(mut self, coordinator: RendezvousCoordinator) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    pub fn metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn build(self) -> PsiServer {
        let coordinator = self.coordinator.unwrap_or_else(|| {
            RendezvousCoordinator::with_config(self.config.coordinator_config())
        });
        let state = create_shared_state(
            coordinator,
            self.config.max_upload_bytes,
            self.config.upload_timeout(),
            self.metrics,
        );

        PsiServer {
            config: self.config,
            state,
        }
    }
}

/// Rendezvous server bound to one coordinator
pub struct PsiServer {
    config: ServerConfig,
    state: SharedState,
}

impl PsiServer {
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.listen_addr();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(addr = %addr, "PSI server listening");
        self.serve(listener).await
    }

    /// Serve on an already bound listener until Ctrl-C
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        tracing::info!("PSI server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_builder_applies_ttl() {
        let config = ServerConfig {
            stale_after_secs: Some(5),
            ..ServerConfig::default()
        };
        let server = ServerBuilder::new(config).build();

        assert_eq!(
            server.state().coordinator.config().stale_after,
            Some(Duration::from_secs(5))
        );
        assert!(server.state().metrics.is_none());
        assert_eq!(server.state().upload_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_uses_given_coordinator() {
        let coordinator = RendezvousCoordinator::new();
        coordinator.submit(psi_core::DigestList::new());

        let server = ServerBuilder::new(ServerConfig::default())
            .coordinator(coordinator)
            .build();
        assert!(server.state().coordinator.status().pending().is_some());
    }
}
