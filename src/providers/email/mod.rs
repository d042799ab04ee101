//! Email fetcher implementations.
//!
//! This module contains the [`MessageFetcher`] trait and the Gmail API
//! implementation. The scan service only ever sees the trait; swapping the
//! backend (or scripting one in tests) requires no core changes.

mod gmail;
mod traits;

pub use gmail::{GmailCredentials, GmailFetcher};
pub use traits::{FetchError, MessageFetcher, Result};
