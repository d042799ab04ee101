//! Seen-set database queries.
//!
//! Membership and insertion for the dedup set of processed message ids.

use chrono::Utc;
use rusqlite::{params, Connection, Result};

use crate::domain::MessageId;

/// Marks a message id as seen. Idempotent: re-marking is a no-op.
pub fn mark_seen(conn: &Connection, id: &MessageId) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO seen_messages (message_id, first_seen_at) VALUES (?1, ?2)",
        params![id.0, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Returns whether a message id has been seen.
pub fn is_seen(conn: &Connection, id: &MessageId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM seen_messages WHERE message_id = ?1",
        params![id.0],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Returns every seen message id.
pub fn all_seen_ids(conn: &Connection) -> Result<Vec<MessageId>> {
    let mut stmt = conn.prepare("SELECT message_id FROM seen_messages ORDER BY first_seen_at")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.map(|r| r.map(MessageId::from)).collect()
}

/// Counts seen message ids.
pub fn count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM seen_messages", [], |row| row.get(0))?;
    Ok(count as u64)
}
