//! Integration tests for the scan pipeline.
//!
//! These tests wire real components together: the SQLite-backed seen-set,
//! the file log sink, and the scan service, with only the mail backend
//! scripted. Per-module logic is covered by unit tests next to the code.

use async_trait::async_trait;

use lookout::domain::{DetectionRules, Message, MessageId};
use lookout::providers::email::{FetchError, MessageFetcher};
use lookout::services::{ScanService, SeenStore};
use lookout::sinks::{AlertSink, LogSink};
use lookout::storage::{Database, SqliteSeenStore};

struct ScriptedFetcher {
    messages: Vec<Message>,
}

#[async_trait]
impl MessageFetcher for ScriptedFetcher {
    async fn list_recent(&self, max_results: u32) -> Result<Vec<Message>, FetchError> {
        Ok(self
            .messages
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}

fn rules() -> DetectionRules {
    DetectionRules::new(
        vec!["invoice".to_string()],
        vec!["trusted.com".to_string()],
        vec![".exe".to_string()],
    )
}

fn inbox() -> Vec<Message> {
    vec![
        Message::new("m1", "Your Invoice is ready", "", "billing.example"),
        Message::new("m2", "hello", "", "x.com").with_attachments(["setup.exe"]),
        Message::new("m3", "invoice", "", "trusted.com"),
        Message::new("m4", "team offsite", "photos attached", "friend.org")
            .with_attachments(["photos.jpg"]),
    ]
}

#[tokio::test]
async fn full_scan_writes_alert_log_lines() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("alerts.txt");

    let db = Database::open_in_memory().await.unwrap();
    let service = ScanService::new(
        ScriptedFetcher { messages: inbox() },
        rules(),
        SqliteSeenStore::new(db),
        vec![Box::new(LogSink::new(&log_path)) as Box<dyn AlertSink>],
        10,
    );

    let summary = service.run_once().await.unwrap();
    assert_eq!(summary.fetched, 4);
    assert_eq!(summary.alerted, 2); // m1 keyword, m2 attachment; m3 whitelisted
    assert_eq!(summary.skipped, 0);
    assert!(summary.is_clean());

    let content = tokio::fs::read_to_string(&log_path).await.unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("message m1"));
    assert!(lines[0].contains("keyword_match"));
    assert!(lines[1].contains("message m2"));
    assert!(lines[1].contains("dangerous_attachment"));
    assert!(lines[1].contains("setup.exe"));
}

#[tokio::test]
async fn rerun_with_persisted_seen_set_alerts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("lookout.db");
    let log_path = dir.path().join("alerts.txt");

    // First run against a fresh database.
    {
        let db = Database::open(&db_path).await.unwrap();
        let service = ScanService::new(
            ScriptedFetcher { messages: inbox() },
            rules(),
            SqliteSeenStore::new(db),
            vec![Box::new(LogSink::new(&log_path)) as Box<dyn AlertSink>],
            10,
        );
        let summary = service.run_once().await.unwrap();
        assert_eq!(summary.alerted, 2);
    }

    // Second run, reopening the database, sees the same batch again.
    {
        let db = Database::open(&db_path).await.unwrap();
        let service = ScanService::new(
            ScriptedFetcher { messages: inbox() },
            rules(),
            SqliteSeenStore::new(db),
            vec![Box::new(LogSink::new(&log_path)) as Box<dyn AlertSink>],
            10,
        );
        let summary = service.run_once().await.unwrap();
        assert_eq!(summary.alerted, 0);
        assert_eq!(summary.skipped, 4);
    }

    // The log holds only the first run's alerts.
    let content = tokio::fs::read_to_string(&log_path).await.unwrap();
    assert_eq!(content.lines().count(), 2);
}

#[tokio::test]
async fn every_processed_message_lands_in_the_seen_set() {
    let db = Database::open_in_memory().await.unwrap();
    let store = SqliteSeenStore::new(db);

    let service = ScanService::new(
        ScriptedFetcher { messages: inbox() },
        rules(),
        store.clone(),
        vec![],
        10,
    );
    service.run_once().await.unwrap();

    for id in ["m1", "m2", "m3", "m4"] {
        assert!(
            store.contains(&MessageId::from(id)).await.unwrap(),
            "{id} missing from seen set"
        );
    }
    assert_eq!(store.len().await.unwrap(), 4);
}

#[tokio::test]
async fn shuffled_batch_produces_the_same_seen_set() {
    let forward = {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqliteSeenStore::new(db);
        let service = ScanService::new(
            ScriptedFetcher { messages: inbox() },
            rules(),
            store.clone(),
            vec![],
            10,
        );
        service.run_once().await.unwrap();
        let mut ids = store.all_ids().await.unwrap();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids
    };

    let reversed = {
        let mut messages = inbox();
        messages.reverse();
        let db = Database::open_in_memory().await.unwrap();
        let store = SqliteSeenStore::new(db);
        let service = ScanService::new(
            ScriptedFetcher { messages },
            rules(),
            store.clone(),
            vec![],
            10,
        );
        service.run_once().await.unwrap();
        let mut ids = store.all_ids().await.unwrap();
        ids.sort_by(|a, b| a.0.cmp(&b.0));
        ids
    };

    assert_eq!(forward, reversed);
}
