//! Bounded, partial-failure-tolerant phone number reassignment.
//!
//! A batch is validated once against [`MAX_BATCH_SIZE`] and then processed
//! strictly in input order, one remote update at a time. A failing item is
//! recorded in its [`ItemOutcome`] and never stops the items after it. Each
//! item gets exactly one attempt; transient retries belong to the client.
//!
//! The engine keeps no memory between calls. Re-running the same ids after a
//! partial failure re-attempts every item, so callers that only want to retry
//! failures should re-submit [`BatchResult::failed_item_ids`].

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::ConnectApi;
use crate::error::RemoteError;

pub const MAX_BATCH_SIZE: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("Only {max} phoneNumberIds are accepted, {count} were passed.")]
    BatchTooLarge { count: usize, max: usize },
}

/// The single-item remote mutation a batch applies to every id.
#[async_trait]
pub trait ItemUpdater: Send + Sync {
    async fn update_item(&self, target_id: &str, item_id: &str) -> Result<(), RemoteError>;
}

/// Reassigns one phone number to the target instance or traffic
/// distribution group.
pub struct PhoneNumberUpdater<'a> {
    client: &'a dyn ConnectApi,
}

impl<'a> PhoneNumberUpdater<'a> {
    pub fn new(client: &'a dyn ConnectApi) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> ItemUpdater for PhoneNumberUpdater<'a> {
    async fn update_item(&self, target_id: &str, item_id: &str) -> Result<(), RemoteError> {
        self.client
            .update_phone_number(target_id, item_id)
            .await
            .map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    target_id: String,
    item_ids: Vec<String>,
}

impl BatchRequest {
    pub fn new(target_id: impl Into<String>, item_ids: Vec<String>) -> Result<Self, BatchError> {
        if item_ids.len() > MAX_BATCH_SIZE {
            return Err(BatchError::BatchTooLarge {
                count: item_ids.len(),
                max: MAX_BATCH_SIZE,
            });
        }

        Ok(Self {
            target_id: target_id.into(),
            item_ids,
        })
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn item_ids(&self) -> &[String] {
        &self.item_ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
}

impl From<&RemoteError> for ErrorDetail {
    fn from(error: &RemoteError) -> Self {
        Self {
            code: error.http_status(),
            message: error.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub item_id: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl ItemOutcome {
    pub fn success(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            status: ItemStatus::Success,
            error: None,
        }
    }

    pub fn failure(item_id: impl Into<String>, error: ErrorDetail) -> Self {
        Self {
            item_id: item_id.into(),
            status: ItemStatus::Failure,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ItemStatus::Success
    }
}

/// Per-item outcomes in input order with counts derived from them, so
/// `success + failure == total == outcomes.len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    outcomes: Vec<ItemOutcome>,
    success_count: usize,
    failure_count: usize,
}

impl BatchResult {
    pub fn from_outcomes(outcomes: Vec<ItemOutcome>) -> Self {
        let success_count = outcomes.iter().filter(|outcome| outcome.is_success()).count();
        let failure_count = outcomes.len() - success_count;
        Self {
            outcomes,
            success_count,
            failure_count,
        }
    }

    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    pub fn total_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed_item_ids(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.is_success())
            .map(|outcome| outcome.item_id.clone())
            .collect()
    }
}

/// Validates the batch size, then processes every item. Oversized batches are
/// rejected before any remote call is made.
pub async fn reassign<U>(
    updater: &U,
    target_id: &str,
    item_ids: Vec<String>,
) -> Result<BatchResult, BatchError>
where
    U: ItemUpdater + ?Sized,
{
    let request = BatchRequest::new(target_id, item_ids)?;
    Ok(execute(updater, &request).await)
}

pub async fn execute<U>(updater: &U, request: &BatchRequest) -> BatchResult
where
    U: ItemUpdater + ?Sized,
{
    let started_at = Instant::now();
    info!(
        component = "batch_reassignment",
        target_id = request.target_id(),
        planned_items = request.item_ids().len(),
        "batch_started"
    );

    let mut outcomes = Vec::with_capacity(request.item_ids().len());
    for item_id in request.item_ids() {
        let outcome = match updater.update_item(request.target_id(), item_id).await {
            Ok(()) => ItemOutcome::success(item_id.as_str()),
            Err(error) => {
                warn!(
                    component = "batch_reassignment",
                    target_id = request.target_id(),
                    item_id = item_id.as_str(),
                    status_code = error.http_status(),
                    error = %error,
                    "item_failed"
                );
                ItemOutcome::failure(item_id.as_str(), ErrorDetail::from(&error))
            }
        };
        outcomes.push(outcome);
    }

    let result = BatchResult::from_outcomes(outcomes);
    info!(
        component = "batch_reassignment",
        target_id = request.target_id(),
        success = result.success_count(),
        failure = result.failure_count(),
        total = result.total_count(),
        duration_ms = started_at.elapsed().as_millis() as u64,
        "batch_completed"
    );
    result
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::testing::RecordingConnect;

    struct CountingUpdater {
        calls: Mutex<Vec<(String, String)>>,
        failing: Vec<(&'static str, RemoteError)>,
    }

    impl CountingUpdater {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: Vec::new(),
            }
        }

        fn failing_on(item_id: &'static str, error: RemoteError) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                failing: vec![(item_id, error)],
            }
        }

        fn called_items(&self) -> Vec<String> {
            self.calls
                .lock()
                .expect("poisoned mutex")
                .iter()
                .map(|(_, item_id)| item_id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ItemUpdater for CountingUpdater {
        async fn update_item(&self, target_id: &str, item_id: &str) -> Result<(), RemoteError> {
            self.calls
                .lock()
                .expect("poisoned mutex")
                .push((target_id.to_string(), item_id.to_string()));
            match self.failing.iter().find(|(failing_id, _)| *failing_id == item_id) {
                Some((_, error)) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    fn ids(count: usize) -> Vec<String> {
        (1..=count).map(|index| format!("p{index}")).collect()
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected_without_remote_calls() {
        let updater = CountingUpdater::new();
        let error = reassign(&updater, "arn:target", ids(26))
            .await
            .expect_err("26 items should be rejected");

        assert_eq!(error, BatchError::BatchTooLarge { count: 26, max: 25 });
        assert_eq!(
            error.to_string(),
            "Only 25 phoneNumberIds are accepted, 26 were passed."
        );
        assert!(updater.called_items().is_empty());
    }

    #[tokio::test]
    async fn full_batch_of_25_is_accepted() {
        let updater = CountingUpdater::new();
        let result = reassign(&updater, "arn:target", ids(25))
            .await
            .expect("25 items are within the cap");

        assert_eq!(result.total_count(), 25);
        assert_eq!(result.success_count(), 25);
        assert_eq!(result.failure_count(), 0);
        assert_eq!(updater.called_items(), ids(25));
    }

    #[tokio::test]
    async fn all_successful_items_keep_input_order() {
        let updater = CountingUpdater::new();
        let input = vec!["c".to_string(), "a".to_string(), "b".to_string()];
        let result = reassign(&updater, "arn:target", input.clone())
            .await
            .expect("batch should run");

        let order: Vec<&str> = result
            .outcomes()
            .iter()
            .map(|outcome| outcome.item_id.as_str())
            .collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert!(result.outcomes().iter().all(|outcome| outcome.error.is_none()));
        assert_eq!(updater.called_items(), input);
    }

    #[tokio::test]
    async fn failure_is_recorded_and_processing_continues() {
        let updater = CountingUpdater::failing_on("p2", RemoteError::with_status(500, "throttled"));
        let result = reassign(&updater, "arn:target", ids(3))
            .await
            .expect("batch should run");

        assert_eq!(
            result.outcomes(),
            &[
                ItemOutcome::success("p1"),
                ItemOutcome::failure(
                    "p2",
                    ErrorDetail {
                        code: 500,
                        message: "throttled".to_string(),
                    },
                ),
                ItemOutcome::success("p3"),
            ]
        );
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.total_count(), 3);
        assert_eq!(updater.called_items(), ids(3));
    }

    #[tokio::test]
    async fn transport_failures_report_default_status() {
        let updater = CountingUpdater::failing_on("p1", RemoteError::transport("connection reset"));
        let result = reassign(&updater, "arn:target", ids(1))
            .await
            .expect("batch should run");

        let detail = result.outcomes()[0].error.clone().expect("error detail");
        assert_eq!(detail.code, 500);
        assert_eq!(detail.message, "connection reset");
    }

    #[tokio::test]
    async fn empty_batch_completes_with_zero_counts() {
        let updater = CountingUpdater::new();
        let result = reassign(&updater, "arn:target", Vec::new())
            .await
            .expect("empty batch is valid");

        assert_eq!(result.total_count(), 0);
        assert_eq!(result.success_count() + result.failure_count(), 0);
    }

    #[tokio::test]
    async fn rerun_without_filter_reattempts_every_item() {
        let client = RecordingConnect::new()
            .fail_phone_number("p2", RemoteError::with_status(429, "Rate exceeded"));
        let updater = PhoneNumberUpdater::new(&client);

        let first = reassign(&updater, "arn:tdg", ids(3)).await.expect("first run");
        assert_eq!(first.failed_item_ids(), vec!["p2".to_string()]);

        reassign(&updater, "arn:tdg", ids(3)).await.expect("second run");
        assert_eq!(client.calls_for("update_phone_number").len(), 6);
    }

    #[tokio::test]
    async fn rerun_with_failed_ids_only_retries_failures() {
        let client = RecordingConnect::new()
            .fail_phone_number("p2", RemoteError::with_status(429, "Rate exceeded"));
        let updater = PhoneNumberUpdater::new(&client);

        let first = reassign(&updater, "arn:tdg", ids(3)).await.expect("first run");
        let retry = reassign(&updater, "arn:tdg", first.failed_item_ids())
            .await
            .expect("retry run");

        assert_eq!(retry.total_count(), 1);
        let calls = client.calls_for("update_phone_number");
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[3].arguments, vec!["arn:tdg".to_string(), "p2".to_string()]);
    }
}
