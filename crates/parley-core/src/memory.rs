//! In-memory [`ConversationStore`] implementation.
//!
//! Reference backend used by tests across the workspace.  State lives behind
//! a single mutex; the store hands out snapshots, never references into its
//! own interior.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::{Result, StoreError};
use crate::models::{Group, GroupInfo, Message, Participant, User};
use crate::store::{AddOutcome, ConversationStore};
use crate::types::{GroupId, UserId};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    groups: HashMap<GroupId, Group>,
    participants: Vec<Participant>,
    messages: Vec<Message>,
    next_group: i64,
}

/// Mutex-guarded in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Transient(format!("lock poisoned: {e}")))
    }

    /// Register a user.  Overwrites any existing record with the same id.
    pub fn add_user(&self, user: User) -> Result<()> {
        self.lock()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    pub fn user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    /// Current active-group pointer for `user`.
    pub fn active_group_of(&self, user: &UserId) -> Result<GroupId> {
        self.lock()?
            .users
            .get(user)
            .map(|u| u.active_group)
            .ok_or(StoreError::NotFound)
    }

    pub fn group(&self, id: GroupId) -> Result<Option<Group>> {
        Ok(self.lock()?.groups.get(&id).cloned())
    }

    pub fn group_count(&self) -> Result<usize> {
        Ok(self.lock()?.groups.len())
    }

    /// Append a message.  Vec order doubles as arrival order.
    pub fn insert_message(&self, message: Message) -> Result<()> {
        self.lock()?.messages.push(message);
        Ok(())
    }

    pub fn last_seen_of(&self, user: &UserId, group: GroupId) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .lock()?
            .participants
            .iter()
            .find(|p| p.group_id == group && &p.user_id == user)
            .map(|p| p.last_seen_at))
    }
}

impl ConversationStore for MemoryStore {
    fn find_shared_direct_group(&self, a: &UserId, b: &UserId) -> Result<Option<GroupId>> {
        let inner = self.lock()?;
        let shared = inner
            .groups
            .values()
            .filter(|g| g.is_direct)
            .map(|g| g.id)
            .find(|gid| {
                let member = |u: &UserId| {
                    inner
                        .participants
                        .iter()
                        .any(|p| p.group_id == *gid && &p.user_id == u)
                };
                member(a) && member(b)
            });
        Ok(shared)
    }

    fn create_group(&self, name: Option<&str>, is_direct: bool) -> Result<GroupId> {
        let mut inner = self.lock()?;
        inner.next_group += 1;
        let id = GroupId(inner.next_group);
        inner.groups.insert(
            id,
            Group {
                id,
                name: name.map(str::to_string),
                avatar: None,
                is_direct,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    fn add_participant(
        &self,
        group: GroupId,
        user: &UserId,
        last_seen: DateTime<Utc>,
    ) -> Result<AddOutcome> {
        let mut inner = self.lock()?;
        if !inner.groups.contains_key(&group) {
            return Err(StoreError::NotFound);
        }
        let already = inner
            .participants
            .iter()
            .any(|p| p.group_id == group && &p.user_id == user);
        if already {
            return Ok(AddOutcome::AlreadyMember);
        }
        inner.participants.push(Participant {
            group_id: group,
            user_id: user.clone(),
            last_seen_at: last_seen,
        });
        Ok(AddOutcome::Added)
    }

    fn set_active_group(&self, user: &UserId, group: GroupId) -> Result<()> {
        let mut inner = self.lock()?;
        match inner.users.get_mut(user) {
            Some(u) => {
                u.active_group = group;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    fn fetch_group_info(&self, group: GroupId) -> Result<GroupInfo> {
        let inner = self.lock()?;
        let g = inner.groups.get(&group).ok_or(StoreError::NotFound)?;
        let participants = inner
            .participants
            .iter()
            .filter(|p| p.group_id == group)
            .cloned()
            .collect();
        Ok(GroupInfo {
            id: g.id,
            is_direct: g.is_direct,
            participants,
        })
    }

    fn fetch_messages(
        &self,
        group: GroupId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Message>> {
        let inner = self.lock()?;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.group_id == group)
            .filter(|m| since.map_or(true, |s| m.sent_at > s))
            .cloned()
            .collect();
        // Stable sort keeps arrival order as the tie-break.
        messages.sort_by_key(|m| m.sent_at);
        Ok(messages)
    }

    fn update_last_seen(&self, user: &UserId, group: GroupId, at: DateTime<Utc>) -> Result<()> {
        let mut inner = self.lock()?;
        match inner
            .participants
            .iter_mut()
            .find(|p| p.group_id == group && &p.user_id == user)
        {
            Some(p) => {
                p.last_seen_at = at;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}
