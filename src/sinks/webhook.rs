//! Webhook alert sink.
//!
//! Posts a JSON summary of each alert to a Slack-compatible webhook URL.
//! The payload carries a human-readable `text` field (rendered by Slack)
//! alongside the structured alert fields for other consumers.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use super::{AlertSink, DeliveryError, Result};
use crate::domain::{AlertReason, AlertRecord};

/// Request timeout for a single delivery attempt.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON body posted to the webhook.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: String,
    message_id: &'a str,
    reasons: &'a [AlertReason],
    matched_keywords: &'a [String],
    matched_attachments: &'a [String],
    detected_at: DateTime<Utc>,
}

impl<'a> WebhookPayload<'a> {
    fn from_alert(alert: &'a AlertRecord) -> Self {
        let mut lines = vec!["*Suspicious message detected*".to_string()];
        if !alert.matched_keywords.is_empty() {
            lines.push(format!(
                "> *Keywords:* {}",
                alert.matched_keywords.join(", ")
            ));
        }
        if !alert.matched_attachments.is_empty() {
            lines.push(format!(
                "> *Attachments:* {}",
                alert.matched_attachments.join(", ")
            ));
        }
        lines.push(format!("> *Message:* {}", alert.message_id));
        lines.push(format!(
            "> *Detected:* {}",
            alert.detected_at.format("%Y-%m-%d %H:%M:%S")
        ));

        Self {
            text: lines.join("\n"),
            message_id: &alert.message_id.0,
            reasons: &alert.reasons,
            matched_keywords: &alert.matched_keywords,
            matched_attachments: &alert.matched_attachments,
            detected_at: alert.detected_at,
        }
    }
}

/// Sink that forwards alerts to a webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    url: Url,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Creates a webhook sink for the given destination URL.
    ///
    /// Returns an error when the URL does not parse; a misconfigured
    /// destination should fail at startup, not on the first alert.
    pub fn new(url: &str) -> std::result::Result<Self, url::ParseError> {
        let url = Url::parse(url)?;
        Ok(Self {
            url,
            client: reqwest::Client::new(),
        })
    }

    /// Returns the destination URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, alert: &AlertRecord) -> Result<()> {
        let payload = WebhookPayload::from_alert(alert);

        let response = self
            .client
            .post(self.url.clone())
            .timeout(DELIVERY_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        Ok(())
    }
}
