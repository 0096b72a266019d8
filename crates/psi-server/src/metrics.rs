//! Prometheus metrics for submissions and rounds

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use psi_core::SubmitOutcome;

pub const SUBMISSIONS_TOTAL: &str = "psi_submissions_total";
pub const REJECTED_UPLOADS_TOTAL: &str = "psi_rejected_uploads_total";
pub const INTERSECTION_SIZE: &str = "psi_intersection_size";
pub const ROUND_DURATION_SECONDS: &str = "psi_round_duration_seconds";
pub const UNDELIVERED_RESULTS_TOTAL: &str = "psi_undelivered_results_total";

/// Install the global Prometheus recorder
pub fn init_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;
    Ok(handle)
}

pub fn record_outcome(outcome: &SubmitOutcome) {
    counter!(SUBMISSIONS_TOTAL, "outcome" => outcome.label()).increment(1);

    if let SubmitOutcome::Computed {
        result,
        partner_waited,
        ..
    } = outcome
    {
        histogram!(INTERSECTION_SIZE).record(result.len() as f64);
        histogram!(ROUND_DURATION_SECONDS).record(partner_waited.as_secs_f64());
    }
}

/// Count an upload refused before reaching the coordinator
pub fn record_rejected(reason: &'static str) {
    counter!(REJECTED_UPLOADS_TOTAL, "reason" => reason).increment(1);
}

/// Count a computed intersection whose requester disconnected first
pub fn record_undelivered() {
    counter!(UNDELIVERED_RESULTS_TOTAL).increment(1);
}
