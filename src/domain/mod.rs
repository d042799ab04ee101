//! Domain layer types for Lookout.
//!
//! This module contains the core domain types used throughout the
//! application: messages, detection rules, alerts, and identifiers.

mod alert;
mod message;
mod rules;
mod types;

pub use alert::{AlertReason, AlertRecord};
pub use message::Message;
pub use rules::DetectionRules;
pub use types::{AccountId, MessageId};
