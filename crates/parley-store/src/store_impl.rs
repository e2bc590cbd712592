//! [`ConversationStore`] implementation for [`Database`].
//!
//! The conversation core only sees the two-variant error taxonomy: missing
//! records stay `NotFound`, everything else (SQLite, I/O, parse failures)
//! is a retryable transient failure.

use chrono::{DateTime, Utc};

use parley_core::store::{AddOutcome, ConversationStore};
use parley_core::{GroupId, GroupInfo, Message, UserId};

use crate::database::Database;
use crate::error::StoreError;

fn to_core(e: StoreError) -> parley_core::StoreError {
    match e {
        StoreError::NotFound => parley_core::StoreError::NotFound,
        other => parley_core::StoreError::Transient(other.to_string()),
    }
}

impl ConversationStore for Database {
    fn find_shared_direct_group(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> parley_core::Result<Option<GroupId>> {
        Database::find_shared_direct_group(self, a, b).map_err(to_core)
    }

    fn create_group(&self, name: Option<&str>, is_direct: bool) -> parley_core::Result<GroupId> {
        Database::create_group(self, name, None, is_direct).map_err(to_core)
    }

    fn add_participant(
        &self,
        group: GroupId,
        user: &UserId,
        last_seen: DateTime<Utc>,
    ) -> parley_core::Result<AddOutcome> {
        Database::add_participant(self, group, user, last_seen).map_err(to_core)
    }

    fn set_active_group(&self, user: &UserId, group: GroupId) -> parley_core::Result<()> {
        Database::set_active_group(self, user, group).map_err(to_core)
    }

    fn fetch_group_info(&self, group: GroupId) -> parley_core::Result<GroupInfo> {
        Database::group_info(self, group).map_err(to_core)
    }

    fn fetch_messages(
        &self,
        group: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> parley_core::Result<Vec<Message>> {
        Database::messages_for_group(self, group, since).map_err(to_core)
    }

    fn update_last_seen(
        &self,
        user: &UserId,
        group: GroupId,
        at: DateTime<Utc>,
    ) -> parley_core::Result<()> {
        Database::update_last_seen(self, user, group, at).map_err(to_core)
    }
}
