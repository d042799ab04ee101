//! SQLite-backed implementation of the scan service's seen-set.

use async_trait::async_trait;

use crate::domain::MessageId;
use crate::services::{ScanError, ScanResult, SeenStore};

use super::{queries, Database};

/// Seen-set persisted in the lookout database.
#[derive(Debug, Clone)]
pub struct SqliteSeenStore {
    db: Database,
}

impl SqliteSeenStore {
    /// Creates a store over an open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns every seen message id, oldest first.
    pub async fn all_ids(&self) -> ScanResult<Vec<MessageId>> {
        self.db
            .with_conn(|conn| Ok(queries::seen::all_seen_ids(conn)?))
            .await
            .map_err(|e| ScanError::Storage(e.to_string()))
    }
}

#[async_trait]
impl SeenStore for SqliteSeenStore {
    async fn contains(&self, id: &MessageId) -> ScanResult<bool> {
        let id = id.clone();
        self.db
            .with_conn(move |conn| Ok(queries::seen::is_seen(conn, &id)?))
            .await
            .map_err(|e| ScanError::Storage(e.to_string()))
    }

    async fn insert(&self, id: &MessageId) -> ScanResult<()> {
        let id = id.clone();
        self.db
            .with_conn(move |conn| Ok(queries::seen::mark_seen(conn, &id)?))
            .await
            .map_err(|e| ScanError::Storage(e.to_string()))
    }

    async fn len(&self) -> ScanResult<u64> {
        self.db
            .with_conn(|conn| Ok(queries::seen::count(conn)?))
            .await
            .map_err(|e| ScanError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_contains() {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqliteSeenStore::new(db);

        let id = MessageId::from("m1");
        assert!(!store.contains(&id).await.unwrap());

        store.insert(&id).await.unwrap();
        assert!(store.contains(&id).await.unwrap());
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        let store = SqliteSeenStore::new(db);

        let id = MessageId::from("m1");
        store.insert(&id).await.unwrap();
        store.insert(&id).await.unwrap();

        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(store.all_ids().await.unwrap(), vec![id]);
    }

    #[tokio::test]
    async fn survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lookout.db");

        {
            let db = Database::open(&path).await.unwrap();
            let store = SqliteSeenStore::new(db);
            store.insert(&MessageId::from("m1")).await.unwrap();
        }

        let db = Database::open(&path).await.unwrap();
        let store = SqliteSeenStore::new(db);
        assert!(store.contains(&MessageId::from("m1")).await.unwrap());
    }
}
