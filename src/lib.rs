//! lookout - a batch inbox watchdog
//!
//! This crate scans recent Gmail messages for suspicious content (keyword
//! matches, dangerous attachments), deduplicates against previously
//! processed messages, and delivers alerts to a local log file and an
//! optional webhook.

pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
pub mod sinks;
pub mod storage;
