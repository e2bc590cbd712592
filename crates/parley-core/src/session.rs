//! Per-viewer view state machine.
//!
//! A [`ChatView`] tracks which group the viewer's message pane shows
//! (`NoActiveGroup` -> `Viewing`) and owns the [`MessageSequencer`] for it.
//! Snapshots arriving from the feed are applied last-writer-wins; a snapshot
//! whose group no longer matches the viewed one is silently discarded
//! (check-before-apply), since the next refresh cycle self-corrects.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Message, RenderedMessage};
use crate::sequencer::MessageSequencer;
use crate::store::ConversationStore;
use crate::types::{GroupId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    NoActiveGroup,
    Viewing(GroupId),
}

/// Result of offering a message snapshot to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The snapshot targeted a group the viewer has navigated away from.
    /// Not user-visible.
    StaleDiscarded,
}

#[derive(Debug)]
pub struct ChatView {
    viewer: UserId,
    state: ViewState,
    sequencer: MessageSequencer,
}

impl ChatView {
    pub fn new(viewer: UserId) -> Self {
        let sequencer = MessageSequencer::new(viewer.clone());
        Self {
            viewer,
            state: ViewState::NoActiveGroup,
            sequencer,
        }
    }

    pub fn viewer(&self) -> &UserId {
        &self.viewer
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// The group currently shown, if any.
    pub fn viewing(&self) -> Option<GroupId> {
        match self.state {
            ViewState::Viewing(group) => Some(group),
            ViewState::NoActiveGroup => None,
        }
    }

    /// The current display sequence.
    pub fn rendered(&self) -> &[RenderedMessage] {
        self.sequencer.rendered()
    }

    /// `sent_at` of the newest rendered message; poll cycles use it as the
    /// `since` bound.
    pub fn newest_rendered_at(&self) -> Option<DateTime<Utc>> {
        self.sequencer.rendered().last().map(|r| r.message.sent_at)
    }

    /// Switch the pane to `group`: full fetch + full sequencer refresh.
    ///
    /// The viewer's seen-time for the entered group is advanced as a side
    /// effect; failure there is logged and ignored (the store's own
    /// durability catches up on the next render).  The group being left is
    /// deliberately not touched.
    pub fn activate<S: ConversationStore>(
        &mut self,
        store: &S,
        group: GroupId,
        now: DateTime<Utc>,
    ) -> Result<&[RenderedMessage]> {
        let messages = store.fetch_messages(group, None)?;
        self.state = ViewState::Viewing(group);
        self.sequencer.refresh(&messages);
        self.touch_last_seen(store, group, now);
        Ok(self.sequencer.rendered())
    }

    /// Offer newly arrived messages for `group`.
    ///
    /// Discarded without effect when `group` is not the viewed one -- the
    /// snapshot raced a navigation and is stale.
    pub fn apply_incoming<S: ConversationStore>(
        &mut self,
        store: &S,
        group: GroupId,
        messages: &[Message],
        now: DateTime<Utc>,
    ) -> ApplyOutcome {
        match self.state {
            ViewState::Viewing(current) if current == group => {
                self.sequencer.append(messages);
                self.touch_last_seen(store, group, now);
                ApplyOutcome::Applied
            }
            _ => {
                debug!(group = %group, "discarding stale message snapshot");
                ApplyOutcome::StaleDiscarded
            }
        }
    }

    /// Drop all view state (logout / conversation pane closed).
    pub fn reset(&mut self) {
        self.state = ViewState::NoActiveGroup;
        self.sequencer.clear();
    }

    fn touch_last_seen<S: ConversationStore>(
        &self,
        store: &S,
        group: GroupId,
        now: DateTime<Utc>,
    ) {
        if let Err(e) = store.update_last_seen(&self.viewer, group, now) {
            warn!(user = %self.viewer, group = %group, error = %e, "failed to record last-seen");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::memory::MemoryStore;
    use crate::models::User;
    use crate::store::ConversationStore;

    fn setup() -> (MemoryStore, GroupId, UserId) {
        let store = MemoryStore::new();
        let alice = UserId::from("alice@x");
        store
            .add_user(User {
                id: alice.clone(),
                name: "alice".into(),
                avatar: None,
                active_group: GroupId::NONE,
            })
            .unwrap();
        let gid = store.create_group(None, false).unwrap();
        store.add_participant(gid, &alice, Utc::now()).unwrap();
        (store, gid, alice)
    }

    fn msg(group: GroupId, author: &str, minutes: i64) -> Message {
        Message {
            group_id: group,
            author_id: UserId::from(author),
            body: "hi".into(),
            sent_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn activate_refreshes_and_advances_last_seen() {
        let (store, gid, alice) = setup();
        store.insert_message(msg(gid, "alice@x", 0)).unwrap();
        store.insert_message(msg(gid, "alice@x", 5)).unwrap();

        let mut view = ChatView::new(alice.clone());
        let render_time = Utc::now();
        let rendered = view.activate(&store, gid, render_time).unwrap();

        assert_eq!(rendered.len(), 2);
        assert_eq!(view.viewing(), Some(gid));
        assert_eq!(store.last_seen_of(&alice, gid).unwrap(), Some(render_time));
    }

    #[test]
    fn stale_snapshot_is_discarded() {
        let (store, gid, alice) = setup();
        let other = store.create_group(None, false).unwrap();
        store.add_participant(other, &alice, Utc::now()).unwrap();

        let mut view = ChatView::new(alice);
        view.activate(&store, gid, Utc::now()).unwrap();

        let outcome =
            view.apply_incoming(&store, other, &[msg(other, "bob@x", 0)], Utc::now());
        assert_eq!(outcome, ApplyOutcome::StaleDiscarded);
        assert!(view.rendered().is_empty());
    }

    #[test]
    fn incoming_for_viewed_group_appends() {
        let (store, gid, alice) = setup();
        store.insert_message(msg(gid, "bob@x", 0)).unwrap();

        let mut view = ChatView::new(alice);
        view.activate(&store, gid, Utc::now()).unwrap();
        assert_eq!(view.rendered().len(), 1);

        let outcome =
            view.apply_incoming(&store, gid, &[msg(gid, "bob@x", 10)], Utc::now());
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(view.rendered().len(), 2);
        assert!(!view.rendered()[1].starts_run);
    }

    #[test]
    fn last_seen_failure_does_not_block_render() {
        // The viewer is not a participant of the group, so the last-seen
        // write fails with NotFound; rendering must still succeed.
        let store = MemoryStore::new();
        let gid = store.create_group(None, false).unwrap();
        store.insert_message(msg(gid, "bob@x", 0)).unwrap();

        let mut view = ChatView::new(UserId::from("ghost@x"));
        let rendered = view.activate(&store, gid, Utc::now()).unwrap();
        assert_eq!(rendered.len(), 1);
    }

    #[test]
    fn reset_returns_to_no_active_group() {
        let (store, gid, alice) = setup();
        let mut view = ChatView::new(alice);
        view.activate(&store, gid, Utc::now()).unwrap();

        view.reset();
        assert_eq!(view.state(), ViewState::NoActiveGroup);
        assert!(view.rendered().is_empty());
        assert!(view.newest_rendered_at().is_none());
    }
}
