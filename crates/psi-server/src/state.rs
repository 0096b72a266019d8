//! Shared server state

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use psi_core::RendezvousCoordinator;

pub struct ServerState {
    pub coordinator: RendezvousCoordinator,
    pub max_upload_bytes: usize,
    /// Deadline for receiving an upload body once its slot is reserved
    pub upload_timeout: Duration,
    /// Present when a Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

pub type SharedState = Arc<ServerState>;

pub fn create_shared_state(
    coordinator: RendezvousCoordinator,
    max_upload_bytes: usize,
    upload_timeout: Duration,
    metrics: Option<PrometheusHandle>,
) -> SharedState {
    Arc::new(ServerState {
        coordinator,
        max_upload_bytes,
        upload_timeout,
        metrics,
    })
}
