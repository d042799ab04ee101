//! Message domain type.
//!
//! Represents one fetched email, normalized at the fetcher boundary so the
//! classifier never sees missing fields.

use serde::{Deserialize, Serialize};

use super::MessageId;

/// A normalized email message as seen by the classifier.
///
/// Provider fields that are absent in the raw message (no subject, no
/// parseable sender) are normalized to empty strings rather than options:
/// the classifier treats missing data as "nothing to match against".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Provider-assigned unique identifier.
    pub id: MessageId,
    /// Subject line, empty when the header is missing.
    pub subject: String,
    /// Short preview of the message content.
    pub snippet: String,
    /// Sender domain, lowercased; empty when unknown or unparseable.
    pub sender_domain: String,
    /// Attachment filenames, in payload order. May be empty.
    pub attachment_names: Vec<String>,
}

impl Message {
    /// Creates a message with no attachments.
    pub fn new(
        id: impl Into<MessageId>,
        subject: impl Into<String>,
        snippet: impl Into<String>,
        sender_domain: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            snippet: snippet.into(),
            sender_domain: sender_domain.into().to_lowercase(),
            attachment_names: Vec::new(),
        }
    }

    /// Adds attachment filenames to this message.
    pub fn with_attachments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attachment_names
            .extend(names.into_iter().map(Into::into));
        self
    }
}
