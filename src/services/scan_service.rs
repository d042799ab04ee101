//! Scan service: the run coordinator.
//!
//! Pulls recent messages from the fetcher, classifies each one, deduplicates
//! against the persisted seen-set, dispatches alerts to the configured sinks,
//! and summarizes the run for the operator.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DetectionRules, MessageId};
use crate::providers::email::{FetchError, MessageFetcher};
use crate::sinks::AlertSink;

use super::Classifier;

/// Errors that can abort a scan run.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The fetcher failed; nothing was classified and the seen set is
    /// unchanged.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The seen-set store failed. Fatal: continuing without dedup would
    /// re-alert on the next run.
    #[error("seen-set storage error: {0}")]
    Storage(String),
}

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Storage trait for the set of already-processed message ids.
///
/// Insertions must be idempotent: inserting an id that is already present is
/// not an error and leaves the set unchanged.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Returns whether the id has been processed before.
    async fn contains(&self, id: &MessageId) -> ScanResult<bool>;

    /// Marks the id as processed.
    async fn insert(&self, id: &MessageId) -> ScanResult<()>;

    /// Number of ids in the set.
    async fn len(&self) -> ScanResult<u64>;
}

/// Result of a single scan run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Messages returned by the fetcher.
    pub fetched: usize,
    /// Messages skipped because they were already seen.
    pub skipped: usize,
    /// Messages that produced an alert.
    pub alerted: usize,
    /// Individual sink deliveries that failed.
    pub sink_failures: usize,
    /// Duration of the run.
    pub duration_ms: u64,
}

impl RunSummary {
    /// Returns true when every alert reached every sink.
    pub fn is_clean(&self) -> bool {
        self.sink_failures == 0
    }
}

/// Service that performs one batch scan over recent messages.
pub struct ScanService<F: MessageFetcher, S: SeenStore> {
    fetcher: F,
    classifier: Classifier,
    seen: S,
    sinks: Vec<Box<dyn AlertSink>>,
    max_results: u32,
}

impl<F: MessageFetcher, S: SeenStore> ScanService<F, S> {
    /// Creates a new scan service.
    pub fn new(
        fetcher: F,
        rules: DetectionRules,
        seen: S,
        sinks: Vec<Box<dyn AlertSink>>,
        max_results: u32,
    ) -> Self {
        Self {
            fetcher,
            classifier: Classifier::new(rules),
            seen,
            sinks,
            max_results,
        }
    }

    /// Runs one scan: fetch, dedup, classify, dispatch, summarize.
    ///
    /// A fetch failure aborts the whole run. A sink failure is counted and
    /// logged but never stops processing of the remaining messages, and never
    /// prevents the message from being marked seen.
    pub async fn run_once(&self) -> ScanResult<RunSummary> {
        let started = Instant::now();

        let messages = self.fetcher.list_recent(self.max_results).await?;

        let mut summary = RunSummary {
            fetched: messages.len(),
            ..Default::default()
        };

        for message in &messages {
            if self.seen.contains(&message.id).await? {
                summary.skipped += 1;
                continue;
            }

            if let Some(alert) = self.classifier.classify(message) {
                summary.alerted += 1;
                tracing::warn!(
                    message_id = %message.id,
                    reasons = ?alert.reasons,
                    keywords = ?alert.matched_keywords,
                    attachments = ?alert.matched_attachments,
                    "suspicious message detected"
                );

                for sink in &self.sinks {
                    if let Err(e) = sink.deliver(&alert).await {
                        summary.sink_failures += 1;
                        tracing::error!(
                            sink = sink.name(),
                            message_id = %message.id,
                            error = %e,
                            "alert delivery failed"
                        );
                    }
                }
            }

            // Mark seen whether or not it alerted, so clean messages are
            // never reclassified on the next run.
            self.seen.insert(&message.id).await?;
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            fetched = summary.fetched,
            skipped = summary.skipped,
            alerted = summary.alerted,
            sink_failures = summary.sink_failures,
            "scan complete"
        );

        Ok(summary)
    }
}
