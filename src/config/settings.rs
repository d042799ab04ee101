//! Application settings.
//!
//! Settings are loaded once at startup from
//! `<config_dir>/lookout/settings.json` (or XDG equivalent); a missing file
//! yields the defaults. A couple of values can be overridden through the
//! environment for compatibility with older deployments: `WEBHOOK_URL` and
//! `GMAIL_MAX_RESULTS`. Settings are immutable for the duration of a run.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DetectionRules;

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no home directory available to resolve config/data paths")]
    NoProjectDirs,
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Top-level application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Account identifier, used for credential lookup.
    pub account: String,
    /// Maximum number of recent messages to fetch per run.
    pub max_results: u32,
    /// Detection rule lists.
    pub detection: DetectionSettings,
    /// Notification configuration.
    pub notify: NotifySettings,
    /// File path overrides.
    pub paths: PathSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            account: "default".to_string(),
            max_results: 10,
            detection: DetectionSettings::default(),
            notify: NotifySettings::default(),
            paths: PathSettings::default(),
        }
    }
}

/// Raw detection rule lists as written in the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Case-insensitive keywords searched in subject and snippet.
    pub keywords: Vec<String>,
    /// Sender domains that never alert.
    pub whitelist_domains: Vec<String>,
    /// Attachment extensions considered dangerous.
    pub dangerous_extensions: Vec<String>,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            keywords: vec!["confidential".to_string(), "password".to_string()],
            whitelist_domains: vec![],
            dangerous_extensions: vec![
                ".zip".to_string(),
                ".exe".to_string(),
                ".js".to_string(),
                ".bat".to_string(),
            ],
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    /// Webhook destination. `None` disables the webhook sink; that is not
    /// an error.
    pub webhook_url: Option<String>,
}

/// Optional overrides for data file locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Seen-set database path. Defaults to `<data_dir>/lookout.db`.
    pub database: Option<PathBuf>,
    /// Alert log path. Defaults to `<data_dir>/alerts.txt`.
    pub alert_log: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from the platform config directory, then applies
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path()?;
        let mut settings = Self::load_from(&path)?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Loads settings from a specific file; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies `WEBHOOK_URL` and `GMAIL_MAX_RESULTS` from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var("WEBHOOK_URL").ok(),
            std::env::var("GMAIL_MAX_RESULTS").ok(),
        );
    }

    fn apply_overrides(&mut self, webhook_url: Option<String>, max_results: Option<String>) {
        if let Some(url) = webhook_url.filter(|u| !u.is_empty()) {
            self.notify.webhook_url = Some(url);
        }
        if let Some(raw) = max_results {
            match raw.parse::<u32>() {
                Ok(n) => self.max_results = n,
                Err(_) => {
                    tracing::warn!(value = %raw, "ignoring unparseable GMAIL_MAX_RESULTS")
                }
            }
        }
    }

    /// Builds the normalized detection rules from the raw lists.
    pub fn detection_rules(&self) -> DetectionRules {
        DetectionRules::new(
            self.detection.keywords.clone(),
            self.detection.whitelist_domains.clone(),
            self.detection.dangerous_extensions.clone(),
        )
    }

    /// Default settings file location.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.config_dir().join("settings.json"))
    }

    /// Resolved seen-set database path.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.paths.database {
            return Ok(path.clone());
        }
        Ok(project_dirs()?.data_dir().join("lookout.db"))
    }

    /// Resolved alert log path.
    pub fn alert_log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.paths.alert_log {
            return Ok(path.clone());
        }
        Ok(project_dirs()?.data_dir().join("alerts.txt"))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("io", "Lookout", "lookout").ok_or(SettingsError::NoProjectDirs)
}
