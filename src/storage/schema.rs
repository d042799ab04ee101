//! SQL schema definitions as const strings.

/// SQL to create the seen-messages table (the persisted dedup set).
///
/// The primary key gives indexed membership tests; inserts use
/// `INSERT OR IGNORE` so re-marking an id is a no-op.
pub const CREATE_SEEN_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS seen_messages (
    message_id TEXT PRIMARY KEY,
    first_seen_at TEXT NOT NULL
)
"#;

/// Returns all migrations in execution order.
pub fn all_migrations() -> Vec<&'static str> {
    vec![CREATE_SEEN_MESSAGES]
}
