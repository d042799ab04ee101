//! Database and credential storage.
//!
//! This module provides the storage layer for Lookout, including:
//!
//! - SQLite database holding the seen-set (dedup across runs)
//! - OS keychain integration for OAuth credential storage
//! - Async-safe database operations via tokio::task::spawn_blocking

mod database;
mod keychain;
pub mod queries;
mod schema;
mod seen_store;

pub use database::{Database, DatabaseError, Result};
pub use keychain::{KeychainAccess, KeychainError};
pub use seen_store::SqliteSeenStore;
