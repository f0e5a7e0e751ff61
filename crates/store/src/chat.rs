//! Live-stream chat channel.
//!
//! Streams and their comments are an append-only log in SQLite, plus a
//! publish/subscribe hub: every comment insert is broadcast to the stream's
//! subscribers. Subscriptions are plain `broadcast::Receiver`s — dropping
//! one cancels it. No aggregation is ever performed over comments.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tokio::sync::broadcast;
use uuid::Uuid;

use remate_core::{Error, LiveStream, Result, StreamComment};

const CREATE_CHAT: &str = "
CREATE TABLE IF NOT EXISTS live_streams (
    id          TEXT PRIMARY KEY,
    youtube_url TEXT NOT NULL,
    title       TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS stream_comments (
    id          TEXT PRIMARY KEY,
    stream_id   TEXT NOT NULL,
    author_name TEXT NOT NULL,
    message     TEXT NOT NULL,
    created_at  TEXT NOT NULL
)";

const DEFAULT_TITLE: &str = "Remate en Vivo";

/// Broadcast buffer per stream; slow subscribers skip, they don't block.
const CHANNEL_CAPACITY: usize = 256;

/// Live-stream and comment store with insert notifications.
pub struct ChatStore {
    conn: Mutex<Connection>,
    hub: Mutex<HashMap<String, broadcast::Sender<StreamComment>>>,
}

fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn map_stream(row: &Row<'_>) -> rusqlite::Result<LiveStream> {
    let created_at: String = row.get("created_at")?;
    Ok(LiveStream {
        id: row.get("id")?,
        youtube_url: row.get("youtube_url")?,
        title: row.get("title")?,
        is_active: row.get::<_, i64>("is_active")? != 0,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<StreamComment> {
    let created_at: String = row.get("created_at")?;
    Ok(StreamComment {
        id: row.get("id")?,
        stream_id: row.get("stream_id")?,
        author_name: row.get("author_name")?,
        message: row.get("message")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

impl ChatStore {
    /// Open (creating if needed) the chat tables at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<ChatStore> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path).map_err(|e| Error::unavailable(e.to_string()))?;
        conn.execute_batch(CREATE_CHAT)
            .map_err(|e| Error::unavailable(e.to_string()))?;
        Ok(ChatStore {
            conn: Mutex::new(conn),
            hub: Mutex::new(HashMap::new()),
        })
    }

    /// In-memory store, for tests.
    pub fn open_in_memory() -> Result<ChatStore> {
        let conn = Connection::open_in_memory().map_err(|e| Error::unavailable(e.to_string()))?;
        conn.execute_batch(CREATE_CHAT)
            .map_err(|e| Error::unavailable(e.to_string()))?;
        Ok(ChatStore {
            conn: Mutex::new(conn),
            hub: Mutex::new(HashMap::new()),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::persistence("connection lock poisoned"))
    }

    /// Create a new active stream.
    pub fn create_stream(
        &self,
        youtube_url: impl Into<String>,
        title: Option<String>,
    ) -> Result<LiveStream> {
        let stream = LiveStream {
            id: Uuid::new_v4().to_string(),
            youtube_url: youtube_url.into(),
            title: title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            is_active: true,
            created_at: Utc::now(),
        };
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO live_streams (id, youtube_url, title, is_active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![
                stream.id,
                stream.youtube_url,
                stream.title,
                stream.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::persistence(e.to_string()))?;
        Ok(stream)
    }

    /// Active streams, newest first.
    pub fn list_active(&self) -> Result<Vec<LiveStream>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT * FROM live_streams WHERE is_active = 1 ORDER BY created_at DESC")
            .map_err(|e| Error::persistence(e.to_string()))?;
        let rows = stmt
            .query_map([], map_stream)
            .map_err(|e| Error::persistence(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::persistence(e.to_string()))
    }

    /// Deactivate a stream (the record stays; embeds just stop listing it).
    /// Returns `false` when the id did not exist.
    pub fn deactivate(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE live_streams SET is_active = 0 WHERE id = ?1",
                params![id],
            )
            .map_err(|e| Error::persistence(e.to_string()))?;
        Ok(changed > 0)
    }

    /// Append a comment and notify the stream's subscribers.
    pub fn append_comment(
        &self,
        stream_id: &str,
        author_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<StreamComment> {
        let comment = StreamComment {
            id: Uuid::new_v4().to_string(),
            stream_id: stream_id.to_string(),
            author_name: author_name.into(),
            message: message.into(),
            created_at: Utc::now(),
        };
        {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO stream_comments (id, stream_id, author_name, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    comment.id,
                    comment.stream_id,
                    comment.author_name,
                    comment.message,
                    comment.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| Error::persistence(e.to_string()))?;
        }

        // A send error just means nobody is subscribed right now.
        if let Ok(hub) = self.hub.lock() {
            if let Some(sender) = hub.get(stream_id) {
                let _ = sender.send(comment.clone());
            }
        }
        Ok(comment)
    }

    /// Comments for one stream, oldest first.
    pub fn list_comments(&self, stream_id: &str) -> Result<Vec<StreamComment>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT * FROM stream_comments WHERE stream_id = ?1 ORDER BY created_at ASC",
            )
            .map_err(|e| Error::persistence(e.to_string()))?;
        let rows = stmt
            .query_map(params![stream_id], map_comment)
            .map_err(|e| Error::persistence(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::persistence(e.to_string()))
    }

    /// Subscribe to comment inserts for one stream. Dropping the receiver
    /// cancels the subscription.
    pub fn subscribe(&self, stream_id: &str) -> Result<broadcast::Receiver<StreamComment>> {
        let mut hub = self
            .hub
            .lock()
            .map_err(|_| Error::persistence("hub lock poisoned"))?;
        let sender = hub
            .entry(stream_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        Ok(sender.subscribe())
    }
}
