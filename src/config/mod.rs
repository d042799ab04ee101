//! Configuration and settings management.
//!
//! This module provides application settings types and loading. Settings are
//! stored in the user's config directory as JSON, with a small set of
//! environment overrides.

mod settings;

pub use settings::{
    DetectionSettings, NotifySettings, PathSettings, Settings, SettingsError,
};
