//! CRUD operations for message records.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use parley_core::{GroupId, Message, UserId};

use crate::database::Database;
use crate::error::Result;

impl Database {
    /// Insert a message and return its arrival-order id.
    pub fn insert_message(&self, message: &Message) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO messages (group_id, author_id, body, sent_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                message.group_id.0,
                message.author_id.as_str(),
                message.body,
                message.sent_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// Messages for a group ordered by (`sent_at`, arrival).  With `since`,
    /// only messages strictly newer than the bound.
    pub fn messages_for_group(
        &self,
        group: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>> {
        let mut messages = Vec::new();

        match since {
            Some(bound) => {
                let mut stmt = self.conn().prepare(
                    "SELECT group_id, author_id, body, sent_at
                     FROM messages
                     WHERE group_id = ?1 AND sent_at > ?2
                     ORDER BY sent_at ASC, id ASC",
                )?;
                let rows =
                    stmt.query_map(params![group.0, bound.to_rfc3339()], row_to_message)?;
                for row in rows {
                    messages.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn().prepare(
                    "SELECT group_id, author_id, body, sent_at
                     FROM messages
                     WHERE group_id = ?1
                     ORDER BY sent_at ASC, id ASC",
                )?;
                let rows = stmt.query_map(params![group.0], row_to_message)?;
                for row in rows {
                    messages.push(row?);
                }
            }
        }

        Ok(messages)
    }

    /// Messages sent at or after `bound` (inclusive), same ordering.
    ///
    /// Poll cycles use this instead of a strict bound: `sent_at` ties are
    /// allowed, so a strict comparison against the newest fetched timestamp
    /// would permanently skip a later arrival sharing it.  Rows the caller
    /// already has come back first (ties sort by rowid, and rowids only
    /// grow), so the caller can drop them positionally.
    pub fn messages_from(&self, group: GroupId, bound: DateTime<Utc>) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT group_id, author_id, body, sent_at
             FROM messages
             WHERE group_id = ?1 AND sent_at >= ?2
             ORDER BY sent_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![group.0, bound.to_rfc3339()], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// The newest message of a group, if any.
    pub fn latest_message(&self, group: GroupId) -> Result<Option<Message>> {
        let found = self
            .conn()
            .query_row(
                "SELECT group_id, author_id, body, sent_at
                 FROM messages
                 WHERE group_id = ?1
                 ORDER BY sent_at DESC, id DESC
                 LIMIT 1",
                params![group.0],
                row_to_message,
            )
            .optional()?;
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Message`].
fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let ts_str: String = row.get(3)?;
    let sent_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Message {
        group_id: GroupId(row.get(0)?),
        author_id: UserId(row.get(1)?),
        body: row.get(2)?,
        sent_at,
    })
}
