//! CRUD and lookup operations for group records.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use parley_core::{Group, GroupId, GroupInfo};
use parley_core::UserId;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{ContactSummary, ConversationSummary};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new group and return its generated id.
    pub fn create_group(
        &self,
        name: Option<&str>,
        avatar: Option<&str>,
        is_direct: bool,
    ) -> Result<GroupId> {
        self.conn().execute(
            "INSERT INTO groups (name, avatar, is_direct, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, avatar, is_direct, Utc::now().to_rfc3339()],
        )?;
        Ok(GroupId(self.conn().last_insert_rowid()))
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single group by id.
    pub fn get_group(&self, id: GroupId) -> Result<Group> {
        self.conn()
            .query_row(
                "SELECT id, name, avatar, is_direct, created_at
                 FROM groups
                 WHERE id = ?1",
                params![id.0],
                row_to_group,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Fetch a group's flags together with its current membership.
    pub fn group_info(&self, id: GroupId) -> Result<GroupInfo> {
        let group = self.get_group(id)?;
        let participants = self.participants_of(id)?;
        Ok(GroupInfo {
            id: group.id,
            is_direct: group.is_direct,
            participants,
        })
    }

    /// Find the direct-chat group both users belong to, if any.
    pub fn find_shared_direct_group(&self, a: &UserId, b: &UserId) -> Result<Option<GroupId>> {
        let found = self
            .conn()
            .query_row(
                "SELECT g.id
                 FROM groups g
                 JOIN participants pa ON pa.group_id = g.id AND pa.user_id = ?1
                 JOIN participants pb ON pb.group_id = g.id AND pb.user_id = ?2
                 WHERE g.is_direct = 1
                 LIMIT 1",
                params![a.as_str(), b.as_str()],
                |row| Ok(GroupId(row.get(0)?)),
            )
            .optional()?;
        Ok(found)
    }

    /// Find `user`'s personal seed group: a room they are the sole
    /// participant of.  Created at first sign-in; inviting a contact while
    /// it is active forks it instead of growing it.
    pub fn find_seed_group(&self, user: &UserId) -> Result<Option<GroupId>> {
        let found = self
            .conn()
            .query_row(
                "SELECT g.id
                 FROM groups g
                 JOIN participants p ON p.group_id = g.id AND p.user_id = ?1
                 WHERE g.is_direct = 0
                   AND (SELECT COUNT(*) FROM participants q
                        WHERE q.group_id = g.id) = 1
                 LIMIT 1",
                params![user.as_str()],
                |row| Ok(GroupId(row.get(0)?)),
            )
            .optional()?;
        Ok(found)
    }

    /// Conversations `user` belongs to, newest first, with a one-line
    /// preview of the latest message.  `filter` matches group names as a
    /// substring; empty matches everything.
    pub fn list_conversations(
        &self,
        user: &UserId,
        filter: &str,
        limit: u32,
    ) -> Result<Vec<ConversationSummary>> {
        let pattern = format!("%{filter}%");
        let mut stmt = self.conn().prepare(
            "SELECT g.id, g.name, g.avatar,
                    (SELECT m.body FROM messages m
                      WHERE m.group_id = g.id
                      ORDER BY m.sent_at DESC, m.id DESC
                      LIMIT 1) AS preview
             FROM groups g
             JOIN participants p ON p.group_id = g.id
             WHERE p.user_id = ?1 AND COALESCE(g.name, '') LIKE ?2
             ORDER BY g.created_at DESC
             LIMIT ?3",
        )?;

        let rows = stmt.query_map(params![user.as_str(), pattern, limit], |row| {
            Ok(ConversationSummary {
                group_id: GroupId(row.get(0)?),
                name: row.get(1)?,
                avatar: row.get(2)?,
                preview: row.get(3)?,
            })
        })?;

        let mut conversations = Vec::new();
        for row in rows {
            conversations.push(row?);
        }
        Ok(conversations)
    }

    /// Other users `user` could chat with, alphabetical, each carrying the
    /// shared direct-chat group id ([`GroupId::NONE`] when none exists yet).
    pub fn list_contacts(
        &self,
        user: &UserId,
        filter: &str,
        limit: u32,
    ) -> Result<Vec<ContactSummary>> {
        let pattern = format!("%{filter}%");
        let mut stmt = self.conn().prepare(
            "SELECT u.id, u.name, u.avatar,
                    COALESCE((SELECT g.id
                              FROM groups g
                              JOIN participants pa ON pa.group_id = g.id AND pa.user_id = ?1
                              JOIN participants pb ON pb.group_id = g.id AND pb.user_id = u.id
                              WHERE g.is_direct = 1
                              LIMIT 1), 0) AS direct_group
             FROM users u
             WHERE u.id != ?1 AND u.name LIKE ?2
             ORDER BY u.name ASC
             LIMIT ?3",
        )?;

        let rows = stmt.query_map(params![user.as_str(), pattern, limit], |row| {
            Ok(ContactSummary {
                user_id: UserId(row.get(0)?),
                name: row.get(1)?,
                avatar: row.get(2)?,
                direct_group: GroupId(row.get(3)?),
            })
        })?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?);
        }
        Ok(contacts)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Group`].
fn row_to_group(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
    let created_str: String = row.get(4)?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Group {
        id: GroupId(row.get(0)?),
        name: row.get(1)?,
        avatar: row.get(2)?,
        is_direct: row.get(3)?,
        created_at,
    })
}
