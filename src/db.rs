// src/db.rs

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};

use crate::types::{ChartSpec, ChatMessageRow, ConversationSummary};

/// Conversations untouched for this many days are purged.
pub const RETENTION_DAYS: i64 = 45;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

pub fn unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as i64
}

pub fn open_db(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_millis(2000))?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS conversations (
            id          TEXT PRIMARY KEY,
            device_id   TEXT NOT NULL,
            title       TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            updated_at  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id              TEXT PRIMARY KEY,
            conversation_id TEXT NOT NULL,
            role            TEXT NOT NULL,
            content         TEXT NOT NULL,
            chart           TEXT,
            created_at      INTEGER NOT NULL,
            FOREIGN KEY(conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_conversations_device_updated
            ON conversations(device_id, updated_at);

        CREATE INDEX IF NOT EXISTS idx_messages_conv_created
            ON messages(conversation_id, created_at);
        "#,
    )?;

    Ok(())
}

/// True when the conversation exists and belongs to `device_id`. Lookups for
/// another device's conversation are indistinguishable from missing rows.
pub fn owns_conversation(
    conn: &Connection,
    device_id: &str,
    conversation_id: &str,
) -> Result<bool, rusqlite::Error> {
    let row: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM conversations WHERE id = ?1 AND device_id = ?2",
            params![conversation_id, device_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(row.is_some())
}

pub fn create_conversation(conn: &Connection, device_id: &str) -> Result<String, rusqlite::Error> {
    let conversation_id = uuid::Uuid::new_v4().to_string();
    let now = unix_ms();

    conn.execute(
        "INSERT INTO conversations (id, device_id, title, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![conversation_id, device_id, "New chat", now, now],
    )?;

    Ok(conversation_id)
}

pub fn list_conversations(
    conn: &Connection,
    device_id: &str,
) -> Result<Vec<ConversationSummary>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        r#"
        SELECT
            c.id,
            c.title,
            c.updated_at,
            COALESCE(
                (SELECT substr(m.content, 1, 120)
                 FROM messages m
                 WHERE m.conversation_id = c.id
                 ORDER BY m.created_at DESC
                 LIMIT 1),
                ''
            ) AS preview
        FROM conversations c
        WHERE c.device_id = ?1
        ORDER BY c.updated_at DESC
        LIMIT 100
        "#,
    )?;

    let rows = stmt.query_map([device_id], |row| {
        Ok(ConversationSummary {
            id: row.get(0)?,
            title: row.get(1)?,
            updated_at: row.get(2)?,
            preview: row.get(3)?,
        })
    })?;

    rows.collect()
}

pub fn list_messages(
    conn: &Connection,
    conversation_id: &str,
) -> Result<Vec<ChatMessageRow>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, role, content, chart, created_at
        FROM messages
        WHERE conversation_id = ?1
        ORDER BY created_at ASC
        "#,
    )?;

    let rows = stmt.query_map([conversation_id], |row| {
        let chart_json: Option<String> = row.get(3)?;
        let chart: Option<ChartSpec> =
            chart_json.and_then(|raw| ChartSpec::from_arguments(&raw));

        Ok(ChatMessageRow {
            id: row.get(0)?,
            role: row.get(1)?,
            content: row.get(2)?,
            chart,
            created_at: row.get(4)?,
        })
    })?;

    rows.collect()
}

pub fn insert_message(
    conn: &Connection,
    conversation_id: &str,
    role: &str,
    content: &str,
    chart: Option<&ChartSpec>,
) -> Result<String, rusqlite::Error> {
    let now = unix_ms();
    let msg_id = uuid::Uuid::new_v4().to_string();
    let chart_json = chart.and_then(|spec| serde_json::to_string(spec).ok());

    conn.execute(
        "INSERT INTO messages (id, conversation_id, role, content, chart, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![msg_id, conversation_id, role, content, chart_json, now],
    )?;

    conn.execute(
        "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
        params![now, conversation_id],
    )?;

    // The first user message names an untitled conversation.
    if role == "user" {
        conn.execute(
            "UPDATE conversations SET title = ?1 WHERE id = ?2 AND title = 'New chat'",
            params![derive_title(content), conversation_id],
        )?;
    }

    Ok(msg_id)
}

pub fn rename_conversation(
    conn: &Connection,
    conversation_id: &str,
    title: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "UPDATE conversations SET title = ?1, updated_at = ?2 WHERE id = ?3",
        params![title, unix_ms(), conversation_id],
    )?;
    Ok(())
}

pub fn delete_conversation(
    conn: &Connection,
    conversation_id: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "DELETE FROM messages WHERE conversation_id = ?1",
        params![conversation_id],
    )?;
    conn.execute(
        "DELETE FROM conversations WHERE id = ?1",
        params![conversation_id],
    )?;
    Ok(())
}

/// Delete conversations (and their messages) untouched for longer than the
/// retention window. Returns the number of conversations removed.
pub fn purge_expired(conn: &Connection, retention_days: i64) -> Result<usize, rusqlite::Error> {
    let cutoff = unix_ms() - retention_days * MS_PER_DAY;

    conn.execute(
        "DELETE FROM messages WHERE conversation_id IN
             (SELECT id FROM conversations WHERE updated_at < ?1)",
        params![cutoff],
    )?;
    let purged = conn.execute(
        "DELETE FROM conversations WHERE updated_at < ?1",
        params![cutoff],
    )?;

    Ok(purged)
}

/// First line of the first user message, clipped to a sidebar-friendly
/// length.
fn derive_title(content: &str) -> String {
    let first_line = content.trim().lines().next().unwrap_or("").trim();
    let title: String = first_line.chars().take(60).collect();
    if title.is_empty() {
        "New chat".to_string()
    } else {
        title
    }
}

pub fn resolve_db_path() -> Result<PathBuf, String> {
    let dir = dirs::data_dir()
        .ok_or_else(|| "Could not determine data directory".to_string())?
        .join("aura");
    std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    Ok(dir.join("aura.sqlite3"))
}
