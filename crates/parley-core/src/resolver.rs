//! Group membership resolution.
//!
//! Maps a user's conversation-list selection onto a concrete group id,
//! creating or forking groups as required, then points the acting user's
//! message pane at the result.
//!
//! The decision itself is a pure function ([`plan`]) over explicitly passed
//! state; [`GroupResolver::resolve`] gathers that state from the store and
//! executes the plan.  The execution is deliberately not transactional:
//! every store call stands alone, and the whole request is safe to re-invoke
//! after a transient failure (duplicate creates are avoided by existence
//! checks, duplicate adds report [`AddOutcome::AlreadyMember`] and are
//! ignored).

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::GroupInfo;
use crate::store::{AddOutcome, ConversationStore};
use crate::types::{GroupId, UserId};

/// What the user clicked in the conversation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectRequest {
    /// An existing conversation row: just make it active.
    Switch { group: GroupId },
    /// A contact row with no shared direct chat yet: open (or create) the
    /// two-party conversation with them.
    OpenDirect { contact: UserId },
    /// Pull a contact into the currently active conversation.
    Invite { contact: UserId },
}

/// Concrete store actions a [`SelectRequest`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPlan {
    /// Set the active-group pointer; no membership change.
    SwitchTo(GroupId),
    /// Create a fresh `is_direct` group holding the acting user and the
    /// contact.
    CreateDirect { contact: UserId },
    /// Create a fresh room seeded with `members`, then add the contact.
    /// The group the members came from is left untouched.
    Fork { members: Vec<UserId>, contact: UserId },
    /// Add the contact to an existing multi-party room in place.
    JoinInPlace { group: GroupId, contact: UserId },
}

/// Decide how to satisfy `request`.
///
/// All inputs are explicit: `shared_direct` is the pre-checked shared
/// direct-chat group for `OpenDirect`, and `active` is a fresh snapshot of
/// the acting user's current active group for `Invite` (`None` when no
/// conversation is open).
///
/// A direct chat, or a one-participant seed group, is never grown in place:
/// doing so would inject a third party into a history its other viewer
/// still considers two-party.  Those cases fork instead.
pub fn plan(
    acting: &UserId,
    request: &SelectRequest,
    shared_direct: Option<GroupId>,
    active: Option<&GroupInfo>,
) -> ResolutionPlan {
    match request {
        SelectRequest::Switch { group } => ResolutionPlan::SwitchTo(*group),

        SelectRequest::OpenDirect { contact } => match shared_direct {
            Some(group) => ResolutionPlan::SwitchTo(group),
            None => ResolutionPlan::CreateDirect {
                contact: contact.clone(),
            },
        },

        SelectRequest::Invite { contact } => match active {
            Some(info) if info.is_direct || info.participants.len() == 1 => ResolutionPlan::Fork {
                members: info.participants.iter().map(|p| p.user_id.clone()).collect(),
                contact: contact.clone(),
            },
            Some(info) => ResolutionPlan::JoinInPlace {
                group: info.id,
                contact: contact.clone(),
            },
            // Nothing open: degenerate fork seeded with the acting user only.
            None => ResolutionPlan::Fork {
                members: vec![acting.clone()],
                contact: contact.clone(),
            },
        },
    }
}

/// Executes [`SelectRequest`]s against a [`ConversationStore`] on behalf of
/// one acting user.
pub struct GroupResolver<'a, S: ConversationStore> {
    store: &'a S,
    acting: UserId,
}

impl<'a, S: ConversationStore> GroupResolver<'a, S> {
    pub fn new(store: &'a S, acting: UserId) -> Self {
        Self { store, acting }
    }

    /// Resolve `request` to a persisted group id and make it the acting
    /// user's active group.
    ///
    /// `active` is the caller's current active-group pointer
    /// ([`GroupId::NONE`] when no conversation is open); it is passed in
    /// rather than read from hidden state so the decision always sees the
    /// value the caller acted on.
    pub fn resolve(
        &self,
        active: GroupId,
        request: SelectRequest,
        now: DateTime<Utc>,
    ) -> Result<GroupId> {
        let shared_direct = match &request {
            SelectRequest::OpenDirect { contact } => {
                self.store.find_shared_direct_group(&self.acting, contact)?
            }
            _ => None,
        };
        let active_info = match &request {
            SelectRequest::Invite { .. } if !active.is_none() => {
                Some(self.store.fetch_group_info(active)?)
            }
            _ => None,
        };

        let plan = plan(&self.acting, &request, shared_direct, active_info.as_ref());
        self.execute(plan, now)
    }

    fn execute(&self, plan: ResolutionPlan, now: DateTime<Utc>) -> Result<GroupId> {
        match plan {
            ResolutionPlan::SwitchTo(group) => {
                self.store.set_active_group(&self.acting, group)?;
                debug!(user = %self.acting, group = %group, "switched active group");
                Ok(group)
            }

            ResolutionPlan::CreateDirect { contact } => {
                let group = self.store.create_group(None, true)?;
                self.add_member(group, &self.acting, now)?;
                self.add_member(group, &contact, now)?;
                self.store.set_active_group(&self.acting, group)?;
                info!(user = %self.acting, contact = %contact, group = %group, "created direct chat");
                Ok(group)
            }

            ResolutionPlan::Fork { mut members, contact } => {
                if !members.contains(&self.acting) {
                    members.push(self.acting.clone());
                }
                let group = self.store.create_group(None, false)?;
                for member in &members {
                    self.add_member(group, member, now)?;
                }
                self.add_member(group, &contact, now)?;
                self.store.set_active_group(&self.acting, group)?;
                info!(
                    user = %self.acting,
                    contact = %contact,
                    group = %group,
                    seeded_with = members.len(),
                    "forked into new room"
                );
                Ok(group)
            }

            ResolutionPlan::JoinInPlace { group, contact } => {
                self.add_member(group, &contact, now)?;
                self.store.set_active_group(&self.acting, group)?;
                info!(user = %self.acting, contact = %contact, group = %group, "added contact to room");
                Ok(group)
            }
        }
    }

    /// Add a participant, treating "already a member" as success.
    fn add_member(&self, group: GroupId, user: &UserId, now: DateTime<Utc>) -> Result<()> {
        match self.store.add_participant(group, user, now)? {
            AddOutcome::Added => {}
            AddOutcome::AlreadyMember => {
                debug!(user = %user, group = %group, "participant already present");
            }
        }
        Ok(())
    }
}
