//! Alert domain types.
//!
//! An [`AlertRecord`] is the decision that a message warrants operator
//! attention, together with the evidence that triggered it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MessageId;

/// Why a message was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertReason {
    /// A configured keyword was found in the subject or snippet.
    KeywordMatch,
    /// An attachment carries a dangerous file extension.
    DangerousAttachment,
}

impl std::fmt::Display for AlertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertReason::KeywordMatch => write!(f, "keyword_match"),
            AlertReason::DangerousAttachment => write!(f, "dangerous_attachment"),
        }
    }
}

/// One alert produced for a flagged message.
///
/// `reasons` is never empty: a record only exists when at least one rule
/// fired. `matched_keywords` may be empty when the alert is purely
/// attachment-triggered, and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Unique identifier for this alert.
    pub id: String,
    /// Message that triggered the alert.
    pub message_id: MessageId,
    /// Which rules fired, in detection order.
    pub reasons: Vec<AlertReason>,
    /// Keywords found in the subject or snippet.
    pub matched_keywords: Vec<String>,
    /// Attachment filenames with a dangerous extension.
    pub matched_attachments: Vec<String>,
    /// When the alert was created.
    pub detected_at: DateTime<Utc>,
}

impl AlertRecord {
    /// Creates an alert for a message.
    ///
    /// Reasons are derived from the evidence: `matched_keywords` and/or
    /// `matched_attachments` must be non-empty.
    pub fn new(
        message_id: MessageId,
        matched_keywords: Vec<String>,
        matched_attachments: Vec<String>,
    ) -> Self {
        debug_assert!(!matched_keywords.is_empty() || !matched_attachments.is_empty());

        let mut reasons = Vec::with_capacity(2);
        if !matched_keywords.is_empty() {
            reasons.push(AlertReason::KeywordMatch);
        }
        if !matched_attachments.is_empty() {
            reasons.push(AlertReason::DangerousAttachment);
        }

        Self {
            id: format!("alert-{}", uuid::Uuid::new_v4()),
            message_id,
            reasons,
            matched_keywords,
            matched_attachments,
            detected_at: Utc::now(),
        }
    }

    /// Returns whether the given rule fired for this alert.
    pub fn has_reason(&self, reason: AlertReason) -> bool {
        self.reasons.contains(&reason)
    }
}
