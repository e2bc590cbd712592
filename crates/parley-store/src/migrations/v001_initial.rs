//! v001 -- Initial schema creation.
//!
//! Creates the four core tables: `users`, `groups`, `participants`, and
//! `messages`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id           TEXT PRIMARY KEY NOT NULL,   -- email-like stable id
    name         TEXT NOT NULL,
    avatar       TEXT,
    active_group INTEGER NOT NULL DEFAULT 0   -- 0 = no conversation open
);

-- ----------------------------------------------------------------
-- Groups
-- ----------------------------------------------------------------
-- AUTOINCREMENT keeps ids dense and starting at 1, so 0 stays free as
-- the "not yet created" sentinel.
CREATE TABLE IF NOT EXISTS groups (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT,                          -- direct chats are unnamed
    avatar     TEXT,
    is_direct  INTEGER NOT NULL DEFAULT 0,    -- boolean 0/1
    created_at TEXT NOT NULL                  -- ISO-8601 / RFC-3339
);

-- ----------------------------------------------------------------
-- Participants
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS participants (
    group_id     INTEGER NOT NULL,            -- FK -> groups(id)
    user_id      TEXT NOT NULL,               -- FK -> users(id)
    last_seen_at TEXT NOT NULL,               -- ISO-8601

    PRIMARY KEY (group_id, user_id),
    FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id)  REFERENCES users(id)  ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_participants_user ON participants(user_id);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
-- The autoincrement id doubles as the arrival-order tie-break for
-- messages sharing a sent_at.
CREATE TABLE IF NOT EXISTS messages (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id  INTEGER NOT NULL,               -- FK -> groups(id)
    author_id TEXT NOT NULL,
    body      TEXT NOT NULL,
    sent_at   TEXT NOT NULL,                  -- ISO-8601

    FOREIGN KEY (group_id) REFERENCES groups(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_group_sent
    ON messages(group_id, sent_at);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
