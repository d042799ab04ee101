//! Gmail API fetcher implementation.
//!
//! This module provides a [`MessageFetcher`] implementation using the Gmail
//! REST API. It handles OAuth 2.0 token refresh, message listing, and
//! normalization of raw messages into domain [`Message`] values.
//!
//! # Authentication
//!
//! Gmail uses OAuth 2.0. A refresh token plus client id/secret are stored in
//! the system keychain, referenced by account ID; the fetcher exchanges them
//! for an access token at [`authenticate`](GmailFetcher::authenticate) time.
//! Interactive consent flows are out of scope: the refresh token must already
//! exist.
//!
//! # API Usage
//!
//! This fetcher uses the Gmail API v1:
//! - `users.messages.list` for recent message ids
//! - `users.messages.get` for per-message detail

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{FetchError, MessageFetcher, Result};
use crate::domain::{AccountId, Message, MessageId};
use crate::storage::KeychainAccess;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Gmail API message list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    messages: Option<Vec<GmailMessageRef>>,
    #[allow(dead_code)]
    next_page_token: Option<String>,
    #[allow(dead_code)]
    result_size_estimate: Option<u32>,
}

/// Gmail API message reference (id only).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessageRef {
    id: String,
    #[allow(dead_code)]
    thread_id: Option<String>,
}

/// Gmail API message detail.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessage {
    id: String,
    snippet: Option<String>,
    payload: Option<GmailMessagePayload>,
    #[allow(dead_code)]
    label_ids: Option<Vec<String>>,
}

/// Gmail message payload (headers and body parts).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessagePayload {
    headers: Option<Vec<GmailHeader>>,
    parts: Option<Vec<GmailPart>>,
    #[allow(dead_code)]
    mime_type: Option<String>,
}

/// Gmail message header.
#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

/// Gmail message part (for multipart messages).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPart {
    filename: Option<String>,
    parts: Option<Vec<GmailPart>>,
    #[allow(dead_code)]
    mime_type: Option<String>,
}

/// OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    expires_in: u64,
    #[allow(dead_code)]
    token_type: String,
}

/// OAuth credentials stored in the keychain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailCredentials {
    /// OAuth refresh token.
    pub refresh_token: String,
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

/// Gmail API fetcher.
///
/// Implements [`MessageFetcher`] over the Gmail REST API with OAuth 2.0.
///
/// # Example
///
/// ```ignore
/// use lookout::providers::email::{GmailFetcher, MessageFetcher};
///
/// let mut fetcher = GmailFetcher::new(account_id, keychain);
/// fetcher.authenticate().await?;
/// let messages = fetcher.list_recent(10).await?;
/// ```
pub struct GmailFetcher {
    /// Account ID for keychain credential lookup.
    account_id: AccountId,
    /// Keychain used to load credentials on authenticate.
    keychain: KeychainAccess,
    /// HTTP client for API requests.
    client: reqwest::Client,
    /// OAuth credentials.
    credentials: Option<GmailCredentials>,
    /// Current OAuth access token (refreshed on authenticate).
    access_token: Option<String>,
}

impl GmailFetcher {
    /// Creates a new Gmail fetcher for the specified account.
    ///
    /// The fetcher is not authenticated until
    /// [`authenticate`](Self::authenticate) is called.
    pub fn new(account_id: AccountId, keychain: KeychainAccess) -> Self {
        Self {
            account_id,
            keychain,
            client: reqwest::Client::new(),
            credentials: None,
            access_token: None,
        }
    }

    /// Creates a fetcher with explicit credentials, bypassing the keychain.
    pub fn with_credentials(account_id: AccountId, credentials: GmailCredentials) -> Self {
        Self {
            account_id,
            keychain: KeychainAccess::new(),
            client: reqwest::Client::new(),
            credentials: Some(credentials),
            access_token: None,
        }
    }

    /// Returns the account ID for this fetcher.
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Returns whether the fetcher holds a usable access token.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Authenticates by refreshing the OAuth access token.
    ///
    /// Loads credentials from the keychain when none were injected.
    pub async fn authenticate(&mut self) -> Result<()> {
        if self.credentials.is_none() {
            self.credentials = Some(self.load_credentials().await?);
        }

        self.refresh_access_token().await?;

        tracing::info!(account_id = %self.account_id, "Gmail fetcher authenticated");
        Ok(())
    }

    /// Loads credentials from the system keychain.
    async fn load_credentials(&self) -> Result<GmailCredentials> {
        let key = KeychainAccess::gmail_credentials_key(&self.account_id.0);

        let creds_json = self
            .keychain
            .retrieve(&key)
            .await
            .map_err(|e| FetchError::Authentication(format!("keychain error: {}", e)))?
            .ok_or_else(|| {
                FetchError::Authentication(format!("no credentials stored for {}", self.account_id))
            })?;

        serde_json::from_str(&creds_json)
            .map_err(|e| FetchError::Authentication(format!("invalid credentials: {}", e)))
    }

    /// Refreshes the OAuth access token using the refresh token.
    async fn refresh_access_token(&mut self) -> Result<String> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| FetchError::Authentication("no credentials available".to_string()))?;

        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Authentication(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(format!("parse token response: {}", e)))?;

        self.access_token = Some(token_response.access_token.clone());
        Ok(token_response.access_token)
    }

    /// Makes an authenticated GET request to the Gmail API.
    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T> {
        let token = self
            .access_token
            .as_ref()
            .ok_or_else(|| FetchError::Authentication("not authenticated".to_string()))?;

        let url = format!("{}{}", GMAIL_API_BASE, endpoint);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(format!("parse response: {}", e)))
    }

    /// Maps API error responses to fetch errors.
    async fn handle_error(&self, response: reqwest::Response) -> FetchError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => FetchError::Authentication(format!("unauthorized: {}", body)),
            404 => FetchError::NotFound(body),
            429 => FetchError::RateLimited {
                retry_after_secs: None,
            },
            _ => FetchError::Internal(format!("API error ({}): {}", status, body)),
        }
    }

    /// Extracts the domain from an address header value like
    /// `"Name <user@example.com>"`, lowercased. Empty when unparseable.
    fn sender_domain(header_value: &str) -> String {
        let value = header_value.trim();

        let email = match (value.find('<'), value.find('>')) {
            (Some(start), Some(end)) if start < end => value[start + 1..end].trim(),
            _ => value,
        };

        email
            .rsplit_once('@')
            .map(|(_, domain)| domain.trim().trim_end_matches('>').to_lowercase())
            .unwrap_or_default()
    }

    /// Recursively collects non-empty attachment filenames from payload parts.
    fn collect_attachment_names(parts: &[GmailPart], names: &mut Vec<String>) {
        for part in parts {
            if let Some(filename) = &part.filename {
                if !filename.is_empty() {
                    names.push(filename.clone());
                }
            }
            if let Some(nested) = &part.parts {
                Self::collect_attachment_names(nested, names);
            }
        }
    }

    /// Normalizes a raw Gmail message into a domain [`Message`].
    ///
    /// Missing fields become empty values; the classifier treats them as
    /// "nothing to match".
    fn normalize(msg: &GmailMessage) -> Message {
        let payload = msg.payload.as_ref();
        let headers = payload.and_then(|p| p.headers.as_ref());

        let get_header = |name: &str| -> Option<&str> {
            headers.and_then(|h| {
                h.iter()
                    .find(|hdr| hdr.name.eq_ignore_ascii_case(name))
                    .map(|hdr| hdr.value.as_str())
            })
        };

        let subject = get_header("Subject").unwrap_or_default().to_string();
        let sender_domain = get_header("From")
            .map(Self::sender_domain)
            .unwrap_or_default();
        let snippet = msg.snippet.clone().unwrap_or_default();

        let mut attachment_names = Vec::new();
        if let Some(parts) = payload.and_then(|p| p.parts.as_ref()) {
            Self::collect_attachment_names(parts, &mut attachment_names);
        }

        Message {
            id: MessageId::from(msg.id.clone()),
            subject,
            snippet,
            sender_domain,
            attachment_names,
        }
    }
}

#[async_trait]
impl MessageFetcher for GmailFetcher {
    async fn list_recent(&self, max_results: u32) -> Result<Vec<Message>> {
        if !self.is_authenticated() {
            return Err(FetchError::Authentication("not authenticated".to_string()));
        }

        let endpoint = format!("/messages?maxResults={}", max_results);
        let list: MessageListResponse = self.get(&endpoint).await?;

        let refs = list.messages.unwrap_or_default();
        let mut messages = Vec::with_capacity(refs.len());

        for msg_ref in refs {
            let detail: GmailMessage = self.get(&format!("/messages/{}", msg_ref.id)).await?;
            messages.push(Self::normalize(&detail));
        }

        tracing::debug!(count = messages.len(), "fetched recent messages");
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_domain_from_display_name_form() {
        assert_eq!(
            GmailFetcher::sender_domain("Jane Doe <jane@Example.COM>"),
            "example.com"
        );
    }

    #[test]
    fn sender_domain_from_bare_address() {
        assert_eq!(GmailFetcher::sender_domain("bob@corp.io"), "corp.io");
    }

    #[test]
    fn sender_domain_missing_at_sign() {
        assert_eq!(GmailFetcher::sender_domain("mailer-daemon"), "");
        assert_eq!(GmailFetcher::sender_domain(""), "");
    }

    #[test]
    fn normalize_fills_missing_fields_with_empty() {
        let raw = GmailMessage {
            id: "m1".to_string(),
            snippet: None,
            payload: None,
            label_ids: None,
        };

        let msg = GmailFetcher::normalize(&raw);
        assert_eq!(msg.id, MessageId::from("m1"));
        assert_eq!(msg.subject, "");
        assert_eq!(msg.snippet, "");
        assert_eq!(msg.sender_domain, "");
        assert!(msg.attachment_names.is_empty());
    }

    #[test]
    fn normalize_extracts_headers_and_snippet() {
        let raw = GmailMessage {
            id: "m2".to_string(),
            snippet: Some("preview text".to_string()),
            payload: Some(GmailMessagePayload {
                headers: Some(vec![
                    GmailHeader {
                        name: "Subject".to_string(),
                        value: "Your Invoice".to_string(),
                    },
                    GmailHeader {
                        name: "From".to_string(),
                        value: "Billing <billing@vendor.com>".to_string(),
                    },
                ]),
                parts: None,
                mime_type: None,
            }),
            label_ids: None,
        };

        let msg = GmailFetcher::normalize(&raw);
        assert_eq!(msg.subject, "Your Invoice");
        assert_eq!(msg.snippet, "preview text");
        assert_eq!(msg.sender_domain, "vendor.com");
    }

    #[test]
    fn attachment_names_are_collected_recursively() {
        let parts = vec![GmailPart {
            filename: Some("".to_string()),
            mime_type: Some("multipart/mixed".to_string()),
            parts: Some(vec![
                GmailPart {
                    filename: Some("setup.exe".to_string()),
                    mime_type: None,
                    parts: None,
                },
                GmailPart {
                    filename: None,
                    mime_type: Some("multipart/alternative".to_string()),
                    parts: Some(vec![GmailPart {
                        filename: Some("notes.zip".to_string()),
                        mime_type: None,
                        parts: None,
                    }]),
                },
            ]),
        }];

        let mut names = Vec::new();
        GmailFetcher::collect_attachment_names(&parts, &mut names);
        assert_eq!(names, vec!["setup.exe", "notes.zip"]);
    }

    #[test]
    fn message_list_response_parses_empty_mailbox() {
        let json = r#"{"resultSizeEstimate": 0}"#;
        let list: MessageListResponse = serde_json::from_str(json).unwrap();
        assert!(list.messages.is_none());
    }

    #[test]
    fn message_detail_parses_gmail_shape() {
        let json = r#"{
            "id": "18c2",
            "snippet": "hello there",
            "labelIds": ["INBOX", "UNREAD"],
            "payload": {
                "mimeType": "multipart/mixed",
                "headers": [
                    {"name": "From", "value": "a@b.com"},
                    {"name": "Subject", "value": "hi"}
                ],
                "parts": [
                    {"mimeType": "text/plain", "filename": ""},
                    {"mimeType": "application/zip", "filename": "a.zip"}
                ]
            }
        }"#;

        let detail: GmailMessage = serde_json::from_str(json).unwrap();
        let msg = GmailFetcher::normalize(&detail);
        assert_eq!(msg.subject, "hi");
        assert_eq!(msg.sender_domain, "b.com");
        assert_eq!(msg.attachment_names, vec!["a.zip"]);
    }

    #[test]
    fn unauthenticated_fetcher_reports_no_token() {
        let fetcher = GmailFetcher::with_credentials(
            AccountId::from("test"),
            GmailCredentials {
                refresh_token: "r".to_string(),
                client_id: "c".to_string(),
                client_secret: "s".to_string(),
            },
        );
        assert!(!fetcher.is_authenticated());
    }
}
