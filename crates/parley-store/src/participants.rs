//! CRUD operations for participant (membership) records.

use chrono::{DateTime, Utc};
use rusqlite::params;

use parley_core::store::AddOutcome;
use parley_core::{GroupId, Participant, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    /// Add `user` to `group`.
    ///
    /// Idempotent: the composite primary key plus `INSERT OR IGNORE` turns a
    /// duplicate add into [`AddOutcome::AlreadyMember`], which callers treat
    /// as success when retrying multi-step membership changes.
    pub fn add_participant(
        &self,
        group: GroupId,
        user: &UserId,
        last_seen: DateTime<Utc>,
    ) -> Result<AddOutcome> {
        let affected = self.conn().execute(
            "INSERT OR IGNORE INTO participants (group_id, user_id, last_seen_at)
             VALUES (?1, ?2, ?3)",
            params![group.0, user.as_str(), last_seen.to_rfc3339()],
        )?;
        if affected == 0 {
            Ok(AddOutcome::AlreadyMember)
        } else {
            Ok(AddOutcome::Added)
        }
    }

    /// All participants of a group, ordered by user id.
    pub fn participants_of(&self, group: GroupId) -> Result<Vec<Participant>> {
        let mut stmt = self.conn().prepare(
            "SELECT group_id, user_id, last_seen_at
             FROM participants
             WHERE group_id = ?1
             ORDER BY user_id ASC",
        )?;

        let rows = stmt.query_map(params![group.0], row_to_participant)?;

        let mut participants = Vec::new();
        for row in rows {
            participants.push(row?);
        }
        Ok(participants)
    }

    /// Record that `user` has seen `group` up to `at`.  Callers only pass
    /// render-time "now", so the value advances in practice; the store does
    /// not clamp.
    pub fn update_last_seen(
        &self,
        user: &UserId,
        group: GroupId,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE participants SET last_seen_at = ?3
             WHERE group_id = ?1 AND user_id = ?2",
            params![group.0, user.as_str(), at.to_rfc3339()],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// When `user` last saw `group`.
    pub fn last_seen_of(&self, user: &UserId, group: GroupId) -> Result<DateTime<Utc>> {
        let ts: String = self
            .conn()
            .query_row(
                "SELECT last_seen_at FROM participants
                 WHERE group_id = ?1 AND user_id = ?2",
                params![group.0, user.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })?;
        Ok(DateTime::parse_from_rfc3339(&ts)?.with_timezone(&Utc))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Participant`].
fn row_to_participant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Participant> {
    let ts_str: String = row.get(2)?;
    let last_seen_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Participant {
        group_id: GroupId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        last_seen_at,
    })
}
