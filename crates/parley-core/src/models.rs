//! Domain model structs shared between the core and store implementations.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{GroupId, UserId};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A known user.  The primary key is the email-like [`UserId`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    /// Human-readable display name.
    pub name: String,
    /// Optional avatar reference (URL or blob hash).
    pub avatar: Option<String>,
    /// The group currently shown in this user's message pane.
    /// [`GroupId::NONE`] means no conversation is open.
    pub active_group: GroupId,
}

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// A conversation group.  Direct chats stay two-party forever; rooms may
/// grow.  Groups are never deleted by the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    /// Optional display name.  Direct chats are unnamed; the UI titles them
    /// after the other participant.
    pub name: Option<String>,
    /// Optional avatar reference.
    pub avatar: Option<String>,
    /// `true` = exactly-two-party conversation not intended for growth.
    /// `false` = a room that can be forked into or extended.
    pub is_direct: bool,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// Membership join record.  A user appears at most once per group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub group_id: GroupId,
    pub user_id: UserId,
    /// Advanced (monotonically, by call discipline) whenever this user's
    /// message pane is showing this group.
    pub last_seen_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message.  Immutable once created.  Ordering within a group
/// is total: by `sent_at`, tie-broken by arrival order (which the store
/// preserves in the sequences it returns).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub group_id: GroupId,
    pub author_id: UserId,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// GroupInfo
// ---------------------------------------------------------------------------

/// Snapshot of a group and its membership, as returned by
/// [`crate::ConversationStore::fetch_group_info`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupInfo {
    pub id: GroupId,
    pub is_direct: bool,
    pub participants: Vec<Participant>,
}

// ---------------------------------------------------------------------------
// RenderedMessage
// ---------------------------------------------------------------------------

/// Display-ready wrapper around a [`Message`].  Derived and ephemeral:
/// recomputed whenever sequencing runs, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMessage {
    pub message: Message,
    /// Author equals the viewing user.
    pub is_own: bool,
    /// First message of an author run.
    pub starts_run: bool,
    /// Last message of an author run.
    pub ends_run: bool,
    /// Whether the UI shows a timestamp divider above this message.
    pub show_timestamp: bool,
}
