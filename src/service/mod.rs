// Data service: the external collaborator that supplies reference data and stores records.
//
// The wizard only ever makes two round trips: fetch the lookup lists once at startup, and save
// one record per submission. Implementations:
// - `http::HttpDataService`: talks to a remote endpoint
// - `local::LocalDataService`: reads lookup lists from TOML and appends records to a JSON-lines file

pub mod http;
pub mod local;

use async_trait::async_trait;
use log::warn;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use crate::models::form::FormRecord;
use crate::models::reference::ReferenceData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The request never left: connection refused, unknown host.
    Unreachable,
    /// The request may have been delivered before it failed (timeout, I/O mid-request).
    Transport,
    /// The service answered with a non-success status.
    Rejected { status: u16 },
    /// The service answered but the payload made no sense.
    Decode,
}

/// Error returned by data service calls.
/// Keeps user-friendly messages separate from internal details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{user_message}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    /// Safe to show in the UI
    pub user_message: String,
    /// For logs only
    pub internal_details: String,
}

impl ServiceError {
    pub fn unreachable(user_message: impl Into<String>, internal: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Unreachable,
            user_message: user_message.into(),
            internal_details: internal.into(),
        }
    }

    pub fn transport(user_message: impl Into<String>, internal: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Transport,
            user_message: user_message.into(),
            internal_details: internal.into(),
        }
    }

    pub fn rejected(status: u16, internal: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Rejected { status },
            user_message: format!("The data service refused the request (status {}).", status),
            internal_details: internal.into(),
        }
    }

    pub fn decode(internal: impl Into<String>) -> Self {
        Self {
            kind: ServiceErrorKind::Decode,
            user_message: "The data service returned an unexpected response.".to_string(),
            internal_details: internal.into(),
        }
    }

    /// Safe to send again: the service cannot have stored the record. Only requests that
    /// never connected, and bad-gateway or unavailable answers, qualify. A timeout may follow
    /// a successful write, so it is not retried.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ServiceErrorKind::Unreachable => true,
            ServiceErrorKind::Rejected { status } => matches!(status, 502 | 503),
            ServiceErrorKind::Transport | ServiceErrorKind::Decode => false,
        }
    }
}

#[async_trait]
pub trait DataService: Send + Sync {
    /// Lookup lists used to populate the site suggestions and the equipment dropdown.
    async fn fetch_reference_data(&self) -> Result<ReferenceData, ServiceError>;

    /// Store one submitted record.
    async fn save_record(&self, record: &FormRecord) -> Result<(), ServiceError>;
}

/// Save with bounded, jittered exponential backoff. Only retryable failures are retried;
/// `attempts` counts the first try (0 is treated as 1).
pub async fn save_with_retry(
    service: &dyn DataService,
    record: &FormRecord,
    attempts: u32,
) -> Result<(), ServiceError> {
    let retries = attempts.max(1) as usize - 1;
    let retry_strategy = ExponentialBackoff::from_millis(100)
        .factor(2)
        .max_delay(Duration::from_secs(2))
        .take(retries)
        .map(jitter);

    let mut attempt = 0u32;
    RetryIf::spawn(
        retry_strategy,
        || {
            attempt += 1;
            if attempt > 1 {
                warn!(
                    "[PHASE: service] [STEP: save] Retrying save (attempt {})",
                    attempt
                );
            }
            service.save_record(record)
        },
        |e: &ServiceError| e.is_retryable(),
    )
    .await
}


#[cfg(test)]
mod tests {
    use super::testing::StubService;
    use super::*;

    #[test]
    fn display_shows_user_message_only() {
        let err = ServiceError::transport("Service unreachable.", "tcp connect: errno=111");
        let shown = format!("{}", err);
        assert_eq!(shown, "Service unreachable.");
        assert!(!shown.contains("errno"));
    }

    #[test]
    fn retryable_classification() {
        assert!(ServiceError::unreachable("x", "refused").is_retryable());
        assert!(!ServiceError::transport("x", "timed out").is_retryable());
        assert!(ServiceError::rejected(503, "busy").is_retryable());
        assert!(ServiceError::rejected(502, "bad gateway").is_retryable());
        assert!(!ServiceError::rejected(500, "insert then crash").is_retryable());
        assert!(!ServiceError::rejected(400, "bad").is_retryable());
        assert!(!ServiceError::decode("garbage").is_retryable());
    }

    #[tokio::test]
    async fn retry_recovers_from_transient_failures() {
        let stub = StubService::failing(2, ServiceError::unreachable("down", "refused"));
        let record = FormRecord::default();

        let result = save_with_retry(&stub, &record, 3).await;

        assert!(result.is_ok(), "should succeed on the third attempt");
        assert_eq!(stub.saves(), 3);
        assert_eq!(stub.saved_records().len(), 1);
    }

    #[tokio::test]
    async fn retry_is_bounded() {
        let stub = StubService::failing(10, ServiceError::unreachable("down", "refused"));
        let result = save_with_retry(&stub, &FormRecord::default(), 3).await;
        assert!(result.is_err());
        assert_eq!(stub.saves(), 3);
    }

    #[tokio::test]
    async fn timed_out_save_that_was_stored_is_not_sent_again() {
        let mut stub = StubService::failing(
            10,
            ServiceError::transport("The data service timed out.", "operation timed out"),
        );
        stub.store_before_failing = true;

        let result = save_with_retry(&stub, &FormRecord::default(), 3).await;

        assert!(result.is_err());
        assert_eq!(stub.saves(), 1);
        assert_eq!(stub.saved_records().len(), 1, "exactly one stored row");
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let stub = StubService::failing(10, ServiceError::rejected(422, "bad field"));
        let result = save_with_retry(&stub, &FormRecord::default(), 5).await;
        assert!(result.is_err());
        assert_eq!(stub.saves(), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let stub = StubService::ok();
        save_with_retry(&stub, &FormRecord::default(), 0)
            .await
            .expect("save");
        assert_eq!(stub.saves(), 1);
    }
}
