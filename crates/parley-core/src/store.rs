//! The abstract store the conversation core runs against.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{GroupInfo, Message};
use crate::types::{GroupId, UserId};

/// Outcome of [`ConversationStore::add_participant`].
///
/// Adding a user who is already a member is a no-op, not an error: resolver
/// sequences are retried as a whole, so duplicate adds are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyMember,
}

/// Persistence operations the core depends on.
///
/// Implementations are synchronous; async transports wrap their calls in a
/// blocking section on their own runtime.  Every method may fail with
/// [`crate::StoreError::Transient`]; individual calls are never grouped into
/// a transaction, so multi-step operations built on top of this trait must
/// be idempotent-retry-safe rather than atomic.
pub trait ConversationStore {
    /// Find the direct-chat group shared by exactly this pair, if any.
    fn find_shared_direct_group(&self, a: &UserId, b: &UserId) -> Result<Option<GroupId>>;

    /// Create a new group and return its id.
    fn create_group(&self, name: Option<&str>, is_direct: bool) -> Result<GroupId>;

    /// Add `user` to `group` with the given initial seen-time.
    fn add_participant(
        &self,
        group: GroupId,
        user: &UserId,
        last_seen: DateTime<Utc>,
    ) -> Result<AddOutcome>;

    /// Point `user`'s message pane at `group`.
    fn set_active_group(&self, user: &UserId, group: GroupId) -> Result<()>;

    /// Fetch a group's flags and current membership.
    fn fetch_group_info(&self, group: GroupId) -> Result<GroupInfo>;

    /// Fetch messages for `group`, ordered by (`sent_at`, arrival order).
    /// With `since`, only messages strictly newer than the bound.
    fn fetch_messages(
        &self,
        group: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>>;

    /// Record that `user` has seen `group` up to `at`.  Callers treat this
    /// as fire-and-forget; failures must not block rendering.
    fn update_last_seen(&self, user: &UserId, group: GroupId, at: DateTime<Utc>) -> Result<()>;
}
