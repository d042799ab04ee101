//! Message classifier.
//!
//! Decides whether a single message warrants an alert. Classification is a
//! pure function over the message and the configured rules: no I/O, no
//! shared mutable state, safe to run concurrently on distinct messages.

use crate::domain::{AlertRecord, DetectionRules, Message};

/// Classifies messages against an immutable rule set.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: DetectionRules,
}

impl Classifier {
    /// Creates a classifier over the given rules.
    pub fn new(rules: DetectionRules) -> Self {
        Self { rules }
    }

    /// Returns the rule set in use.
    pub fn rules(&self) -> &DetectionRules {
        &self.rules
    }

    /// Classifies one message, returning an alert when at least one rule
    /// fires and the sender domain is not whitelisted.
    ///
    /// Whitelisting suppresses the alert entirely, regardless of how many
    /// rules would have matched.
    pub fn classify(&self, message: &Message) -> Option<AlertRecord> {
        if self.rules.is_whitelisted(&message.sender_domain) {
            return None;
        }

        let matched_keywords = self.matched_keywords(message);
        let matched_attachments = self.matched_attachments(message);

        if matched_keywords.is_empty() && matched_attachments.is_empty() {
            return None;
        }

        Some(AlertRecord::new(
            message.id.clone(),
            matched_keywords,
            matched_attachments,
        ))
    }

    /// Collects every keyword found in the subject or snippet.
    ///
    /// Matching is a case-insensitive substring search, deliberately without
    /// word-boundary alignment: "invoice" matches "reinvoiced".
    fn matched_keywords(&self, message: &Message) -> Vec<String> {
        let subject = message.subject.to_lowercase();
        let snippet = message.snippet.to_lowercase();

        self.rules
            .keywords()
            .iter()
            .filter(|kw| subject.contains(kw.as_str()) || snippet.contains(kw.as_str()))
            .cloned()
            .collect()
    }

    /// Collects every attachment filename with a dangerous extension.
    fn matched_attachments(&self, message: &Message) -> Vec<String> {
        message
            .attachment_names
            .iter()
            .filter(|name| match extension_of(name) {
                Some(ext) => self.rules.is_dangerous_extension(&ext),
                None => false,
            })
            .cloned()
            .collect()
    }
}

/// Extracts the lowercased extension (including the leading dot) from a
/// filename, or `None` when the name contains no dot.
fn extension_of(filename: &str) -> Option<String> {
    filename
        .rfind('.')
        .map(|idx| filename[idx..].to_lowercase())
}
