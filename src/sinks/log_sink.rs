//! Local alert log sink.
//!
//! Appends one line per alert to a UTF-8 text file. The file is created on
//! first use; existing content is never truncated.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use super::{AlertSink, Result};
use crate::domain::AlertRecord;

/// Append-only file sink for alerts.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    /// Creates a log sink writing to the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the path this sink appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders one alert as a single log line (without trailing newline).
    fn format_line(alert: &AlertRecord) -> String {
        let reasons = alert
            .reasons
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{} | message {} | {} | keywords: {} | attachments: {}",
            alert.detected_at.format("%Y-%m-%d %H:%M:%S"),
            alert.message_id,
            reasons,
            alert.matched_keywords.join(","),
            alert.matched_attachments.join(","),
        )
    }
}

#[async_trait]
impl AlertSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, alert: &AlertRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let mut line = Self::format_line(alert);
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
