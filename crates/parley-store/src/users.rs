//! CRUD operations for user records.

use rusqlite::params;

use parley_core::{GroupId, User, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    /// Insert a user, or refresh name/avatar if the id already exists.  The
    /// active-group pointer is left alone on conflict.
    pub fn upsert_user(&self, id: &UserId, name: &str, avatar: Option<&str>) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (id, name, avatar, active_group)
             VALUES (?1, ?2, ?3, 0)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, avatar = excluded.avatar",
            params![id.as_str(), name, avatar],
        )?;
        Ok(())
    }

    /// Fetch a single user by id.
    pub fn get_user(&self, id: &UserId) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, name, avatar, active_group FROM users WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(User {
                        id: UserId(row.get(0)?),
                        name: row.get(1)?,
                        avatar: row.get(2)?,
                        active_group: GroupId(row.get(3)?),
                    })
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    /// Point the user's message pane at `group`.
    pub fn set_active_group(&self, id: &UserId, group: GroupId) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE users SET active_group = ?2 WHERE id = ?1",
            params![id.as_str(), group.0],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// The group currently shown in the user's message pane
    /// ([`GroupId::NONE`] when no conversation is open).
    pub fn active_group_of(&self, id: &UserId) -> Result<GroupId> {
        self.conn()
            .query_row(
                "SELECT active_group FROM users WHERE id = ?1",
                params![id.as_str()],
                |row| Ok(GroupId(row.get(0)?)),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_preserves_active_group() {
        let db = Database::open_in_memory().unwrap();
        let id = UserId::from("alice@x");

        db.upsert_user(&id, "Alice", None).unwrap();
        let gid = db.create_group(None, None, false).unwrap();
        db.set_active_group(&id, gid).unwrap();

        db.upsert_user(&id, "Alice Cooper", Some("avatar.png")).unwrap();

        let user = db.get_user(&id).unwrap();
        assert_eq!(user.name, "Alice Cooper");
        assert_eq!(user.avatar.as_deref(), Some("avatar.png"));
        assert_eq!(user.active_group, gid);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.get_user(&UserId::from("ghost@x")),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            db.set_active_group(&UserId::from("ghost@x"), GroupId::NONE),
            Err(StoreError::NotFound)
        ));
    }
}
