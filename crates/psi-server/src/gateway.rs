//! Submission gateway: multipart upload in, coordinator outcome out
//!
//! A slot is reserved as soon as the request arrives, before the payload is
//! read, so a third party uploading while two others are in flight is told
//! the service is busy. Receiving the body is bounded by the upload timeout.
//! If reading times out or validation fails the reservation is dropped and the
//! slot is free again.

use axum::extract::Multipart;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use psi_core::{wire, DigestList, SubmitOutcome};
use tokio::sync::oneshot;

use crate::error::{Result, ServerError};
use crate::metrics;
use crate::state::ServerState;

/// A parsed upload
#[derive(Debug)]
pub struct Submission {
    pub file_name: Option<String>,
    pub digests: DigestList,
}

/// Read the digest file field, skipping any other fields
pub async fn read_upload(multipart: &mut Multipart) -> Result<Submission> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(wire::UPLOAD_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping unrelated form field");
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;
        let digests = DigestList::from_bytes(&bytes)?;

        return Ok(Submission { file_name, digests });
    }

    Err(ServerError::MissingField(wire::UPLOAD_FIELD))
}

/// Drive one upload through the coordinator
pub async fn submit(state: &ServerState, mut multipart: Multipart) -> Result<SubmitOutcome> {
    let Some(reservation) = state.coordinator.reserve() else {
        tracing::info!("Both slots held, rejecting upload");
        return Ok(SubmitOutcome::Busy);
    };
    let slot = reservation.slot();

    let timeout = state.upload_timeout;
    let submission = tokio::time::timeout(timeout, read_upload(&mut multipart))
        .await
        .unwrap_or(Err(ServerError::UploadTimeout(timeout)))
        .map_err(|e| {
            tracing::warn!(slot = %slot, error = %e, "Upload rejected, releasing slot");
            e
        })?;

    tracing::info!(
        slot = %slot,
        file_name = submission.file_name.as_deref().unwrap_or("-"),
        count = submission.digests.len(),
        "Upload ingested"
    );

    // Intersecting large lists is CPU bound. The task runs to completion even
    // if this request is dropped meanwhile.
    let (tx, rx) = oneshot::channel();
    tokio::task::spawn_blocking(move || deliver(tx, reservation.fill(submission.digests)));
    rx.await
        .map_err(|_| ServerError::Internal("intersection task failed".to_string()))
}

/// Hand the outcome back to the request. Returns false if it has gone away.
fn deliver(tx: oneshot::Sender<SubmitOutcome>, outcome: SubmitOutcome) -> bool {
    match tx.send(outcome) {
        Ok(()) => true,
        Err(SubmitOutcome::Computed { round, result, .. }) => {
            tracing::warn!(
                round,
                matches = result.len(),
                "Requester disconnected, intersection result discarded"
            );
            metrics::record_undelivered();
            false
        }
        Err(outcome) => {
            tracing::debug!(outcome = outcome.label(), "Requester disconnected");
            false
        }
    }
}

/// Render an outcome as the plain-text response body
pub fn render(outcome: SubmitOutcome) -> Response {
    let label = outcome.label();
    let (status, body) = match outcome {
        SubmitOutcome::Busy => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("{}\n", wire::BUSY_MESSAGE),
        ),
        SubmitOutcome::Waiting { .. } => (StatusCode::OK, format!("{}\n", wire::WAITING_MESSAGE)),
        SubmitOutcome::Computed { result, .. } => (StatusCode::OK, result.to_text()),
    };

    (
        status,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (HeaderName::from_static(wire::OUTCOME_HEADER), label),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use psi_core::SlotId;
    use std::time::Duration;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_deliver_to_live_request() {
        let (tx, mut rx) = oneshot::channel();
        assert!(deliver(tx, SubmitOutcome::Waiting { slot: SlotId::First }));
        assert_eq!(
            rx.try_recv().unwrap(),
            SubmitOutcome::Waiting { slot: SlotId::First }
        );
    }

    #[test]
    fn test_deliver_to_dropped_request() {
        let (tx, rx) = oneshot::channel();
        drop(rx);
        let outcome = SubmitOutcome::Computed {
            round: 1,
            result: DigestList::new(),
            partner_waited: Duration::ZERO,
        };
        assert!(!deliver(tx, outcome));
    }

    #[tokio::test]
    async fn test_render_busy() {
        let response = render(SubmitOutcome::Busy);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[wire::OUTCOME_HEADER], "busy");
        assert_eq!(body_text(response).await.trim_end(), wire::BUSY_MESSAGE);
    }

    #[tokio::test]
    async fn test_render_waiting() {
        let response = render(SubmitOutcome::Waiting { slot: SlotId::First });
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[wire::OUTCOME_HEADER], "waiting");
        assert_eq!(body_text(response).await.trim_end(), wire::WAITING_MESSAGE);
    }

    #[tokio::test]
    async fn test_render_result_one_digest_per_line() {
        let text = format!("{}\n{}\n", "1".repeat(64), "2".repeat(64));
        let result = DigestList::parse(&text).unwrap();
        let response = render(SubmitOutcome::Computed {
            round: 1,
            result,
            partner_waited: Duration::ZERO,
        });
        assert_eq!(response.headers()[wire::OUTCOME_HEADER], "result");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_text(response).await, text);
    }

    #[tokio::test]
    async fn test_render_empty_result() {
        let response = render(SubmitOutcome::Computed {
            round: 1,
            result: DigestList::new(),
            partner_waited: Duration::ZERO,
        });
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());
    }
}
