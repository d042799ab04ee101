//! Alert sinks.
//!
//! A sink is any destination that durably records or forwards an
//! [`AlertRecord`](crate::domain::AlertRecord). Two implementations exist:
//!
//! - [`LogSink`] - appends one human-readable line per alert to a UTF-8 text
//!   file; always active.
//! - [`WebhookSink`] - posts a JSON summary to a Slack-compatible webhook;
//!   active only when a destination URL is configured.
//!
//! Delivery is best-effort and single-attempt: retry and backoff, if wanted,
//! belong to the transport behind the sink.

mod log_sink;
mod webhook;

pub use log_sink::LogSink;
pub use webhook::WebhookSink;

use async_trait::async_trait;

use crate::domain::AlertRecord;

/// Result type alias for sink operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Errors that can occur while delivering an alert to a sink.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Writing to the local log file failed.
    #[error("log write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The webhook endpoint could not be reached.
    #[error("webhook connection error: {0}")]
    Connection(String),

    /// The webhook endpoint rejected the delivery.
    #[error("webhook rejected delivery ({status}): {body}")]
    Rejected {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
}

/// Trait for alert delivery destinations.
///
/// Implementations must be safe to share across tasks; delivery takes `&self`.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Short name used when reporting delivery failures.
    fn name(&self) -> &str;

    /// Delivers one alert. Single attempt, no retry.
    async fn deliver(&self, alert: &AlertRecord) -> Result<()>;
}
