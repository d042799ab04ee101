//! Message fetcher trait definition.
//!
//! This module defines the [`MessageFetcher`] trait which abstracts over the
//! mail backend. The scan service consumes messages through this trait and
//! never talks to a provider directly, which keeps the core testable with
//! scripted fetchers.

use async_trait::async_trait;

use crate::domain::Message;

/// Result type alias for fetcher operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while fetching messages.
///
/// Any of these aborts the current run: nothing is classified and the seen
/// set is left unchanged.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Authentication failed or credentials expired.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// A listed message disappeared before it could be fetched.
    #[error("not found: {0}")]
    NotFound(String),

    /// The provider returned a response we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Trait for mail backends that can list recent messages.
///
/// Implementations return messages newest-first (provider order). The scan
/// service treats the order as processing order only; deduplication makes
/// correctness order-independent.
#[async_trait]
pub trait MessageFetcher: Send + Sync {
    /// Fetches up to `max_results` recent messages, normalized for
    /// classification. May return fewer than requested, or none.
    async fn list_recent(&self, max_results: u32) -> Result<Vec<Message>>;
}
