//! Schema migrations.
//!
//! Each step moves `PRAGMA user_version` forward by one.  The runner walks
//! every outstanding step whenever a database is opened, so a [`crate::Database`]
//! handle is never returned against a stale schema.  A database written by a
//! newer build is refused rather than guessed at.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Schema version this build expects.
pub const CURRENT_VERSION: u32 = 1;

/// Bring the connection's schema up to [`CURRENT_VERSION`].
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let mut version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema v{version} is newer than this build expects (v{CURRENT_VERSION})"
        )));
    }

    while version < CURRENT_VERSION {
        let next = version + 1;
        tracing::info!(from = version, to = next, "applying schema migration");

        match next {
            1 => v001_initial::up(conn).map_err(|e| StoreError::Migration(e.to_string()))?,
            _ => {
                return Err(StoreError::Migration(format!(
                    "no migration step leads to v{next}"
                )))
            }
        }

        conn.pragma_update(None, "user_version", next)?;
        version = next;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);

        // Running again is a no-op.
        run_migrations(&conn).unwrap();
    }

    #[test]
    fn refuses_a_schema_from_the_future() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", CURRENT_VERSION + 1)
            .unwrap();

        assert!(matches!(
            run_migrations(&conn),
            Err(StoreError::Migration(_))
        ));
    }
}
