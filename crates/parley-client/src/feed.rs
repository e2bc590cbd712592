//! Background feed keeping the view in sync with the store.
//!
//! Two delivery modes, never both: when a push channel is available the
//! loop drains it; otherwise it falls back to polling the store on a fixed
//! interval.  Either way, every update funnels through
//! [`handle_feed_event`], which applies it via the view's check-before-apply
//! gate and only then notifies the UI.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use parley_core::{ApplyOutcome, GroupId, Message};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::{
    emit_event, ConversationChangedPayload, MessagesAppendedPayload, UiEvent,
};
use crate::state::{lock_state, SessionState};

/// An update the feed wants applied to the view.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Messages that arrived for `group` since the view last saw it.
    NewMessages {
        group: GroupId,
        messages: Vec<Message>,
    },
    /// The active-group pointer moved (possibly from another device).
    ActiveGroupChanged { group: GroupId },
}

/// Spawn the feed loop on the runtime.
pub fn spawn_feed(
    state: Arc<Mutex<SessionState>>,
    push_rx: Option<mpsc::Receiver<FeedEvent>>,
    config: ClientConfig,
) -> JoinHandle<()> {
    tokio::spawn(run_feed(state, push_rx, config))
}

/// Drive the feed until the push channel closes (push mode) or forever
/// (poll mode).
pub async fn run_feed(
    state: Arc<Mutex<SessionState>>,
    push_rx: Option<mpsc::Receiver<FeedEvent>>,
    config: ClientConfig,
) {
    match push_rx {
        Some(mut rx) if config.push_enabled => {
            info!("feed running in push mode");
            while let Some(event) = rx.recv().await {
                handle_feed_event(&state, event).await;
            }
            warn!("push channel closed, feed stopping");
        }
        _ => {
            info!(interval = ?config.poll_interval, "feed running in poll mode");
            let mut ticker = tokio::time::interval(config.poll_interval);
            loop {
                ticker.tick().await;
                if let Err(e) = poll_once(&state).await {
                    warn!(error = %e, "poll cycle failed");
                }
            }
        }
    }
}

/// Apply one feed event to the view and notify the UI.
///
/// The session lock is released before the UI event is sent so a slow UI
/// consumer never holds up commands.
pub async fn handle_feed_event(state: &Arc<Mutex<SessionState>>, event: FeedEvent) {
    let now = Utc::now();

    let (ui_tx, ui_event) = {
        let mut guard = match lock_state(state) {
            Ok(guard) => guard,
            Err(e) => {
                warn!(error = %e, "feed could not lock session state");
                return;
            }
        };
        let session = &mut *guard;

        let Some(db) = session.database.as_ref() else {
            debug!("feed event with no session, dropping");
            return;
        };
        let Some(view) = session.view.as_mut() else {
            debug!("feed event with no view, dropping");
            return;
        };

        let ui_event = match event {
            FeedEvent::NewMessages { group, messages } => {
                let appended = messages.len();
                match view.apply_incoming(db, group, &messages, now) {
                    ApplyOutcome::Applied => Some(UiEvent::MessagesAppended(
                        MessagesAppendedPayload {
                            group_id: group.0,
                            appended,
                        },
                    )),
                    ApplyOutcome::StaleDiscarded => None,
                }
            }
            FeedEvent::ActiveGroupChanged { group } => {
                match view.activate(db, group, now) {
                    Ok(rendered) => {
                        let message_count = rendered.len();
                        if let Some(profile) = session.profile.as_mut() {
                            profile.active_group = group;
                        }
                        Some(UiEvent::ConversationChanged(ConversationChangedPayload {
                            group_id: group.0,
                            message_count,
                        }))
                    }
                    Err(e) => {
                        warn!(group = %group, error = %e, "failed to activate group from feed");
                        None
                    }
                }
            }
        };

        (session.ui_tx.clone(), ui_event)
    };

    if let (Some(tx), Some(event)) = (ui_tx, ui_event) {
        emit_event(&tx, event).await;
    }
}

/// One poll cycle: reconcile the view against the store.
///
/// Checks the active-group pointer first (it may have moved under us), then
/// fetches messages the view has not rendered yet.  Both findings are
/// turned into ordinary [`FeedEvent`]s so push and poll share one apply
/// path.
///
/// The fetch bound is inclusive: `sent_at` ties are legal, so a strict
/// bound at the newest rendered timestamp would skip a later arrival
/// sharing it for as long as the viewer stays in the group.  Rendered rows
/// at the bound come back first (ties sort by rowid, and every rendered row
/// predates anything still unrendered), so they are dropped positionally.
async fn poll_once(state: &Arc<Mutex<SessionState>>) -> Result<(), ClientError> {
    let event = {
        let guard = lock_state(state)?;

        let Some(profile) = guard.profile.as_ref() else {
            return Ok(());
        };
        let Some(db) = guard.database.as_ref() else {
            return Ok(());
        };
        let Some(view) = guard.view.as_ref() else {
            return Ok(());
        };

        let pointer = db.active_group_of(&profile.id)?;
        let viewing = view.viewing();

        if !pointer.is_none() && viewing != Some(pointer) {
            Some(FeedEvent::ActiveGroupChanged { group: pointer })
        } else if let Some(group) = viewing {
            let messages = match view.newest_rendered_at() {
                None => db.messages_for_group(group, None)?,
                Some(bound) => {
                    let batch = db.messages_from(group, bound)?;
                    let rendered_ties = view
                        .rendered()
                        .iter()
                        .rev()
                        .take_while(|r| r.message.sent_at == bound)
                        .count();
                    batch[rendered_ties.min(batch.len())..].to_vec()
                }
            };
            if messages.is_empty() {
                None
            } else {
                Some(FeedEvent::NewMessages { group, messages })
            }
        } else {
            None
        }
    };

    if let Some(event) = event {
        handle_feed_event(state, event).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use parley_core::{SelectRequest, UserId};

    use crate::commands::conversations::open_conversation;
    use crate::commands::session::sign_in;

    fn signed_in_state(
        dir: &tempfile::TempDir,
        id: &str,
        name: &str,
    ) -> Arc<Mutex<SessionState>> {
        let config = ClientConfig {
            database_path: Some(dir.path().join("parley.db")),
            ..ClientConfig::default()
        };
        let state = Arc::new(Mutex::new(SessionState::new()));
        sign_in(&state, &config, UserId::from(id), name, None).unwrap();
        state
    }

    fn msg(group: GroupId, author: &str, minutes: i64) -> Message {
        Message {
            group_id: group,
            author_id: UserId::from(author),
            body: "hi".into(),
            sent_at: Utc::now() + Duration::minutes(minutes),
        }
    }

    #[tokio::test]
    async fn push_event_appends_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let alice = signed_in_state(&dir, "alice@x", "Alice");
        let _bob = signed_in_state(&dir, "bob@x", "Bob");

        open_conversation(
            &alice,
            SelectRequest::OpenDirect {
                contact: UserId::from("bob@x"),
            },
        )
        .unwrap();
        let group = {
            let guard = alice.lock().unwrap();
            guard.view.as_ref().unwrap().viewing().unwrap()
        };

        let (ui_tx, mut ui_rx) = mpsc::channel(8);
        alice.lock().unwrap().ui_tx = Some(ui_tx);

        handle_feed_event(
            &alice,
            FeedEvent::NewMessages {
                group,
                messages: vec![msg(group, "bob@x", 0)],
            },
        )
        .await;

        let event = ui_rx.try_recv().unwrap();
        assert!(matches!(
            event,
            UiEvent::MessagesAppended(MessagesAppendedPayload { appended: 1, .. })
        ));
        assert_eq!(alice.lock().unwrap().view.as_ref().unwrap().rendered().len(), 1);
    }

    #[tokio::test]
    async fn stale_push_event_emits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let alice = signed_in_state(&dir, "alice@x", "Alice");
        let _bob = signed_in_state(&dir, "bob@x", "Bob");

        open_conversation(
            &alice,
            SelectRequest::OpenDirect {
                contact: UserId::from("bob@x"),
            },
        )
        .unwrap();

        let (ui_tx, mut ui_rx) = mpsc::channel(8);
        alice.lock().unwrap().ui_tx = Some(ui_tx);

        let elsewhere = GroupId(999);
        handle_feed_event(
            &alice,
            FeedEvent::NewMessages {
                group: elsewhere,
                messages: vec![msg(elsewhere, "bob@x", 0)],
            },
        )
        .await;

        assert!(ui_rx.try_recv().is_err());
        assert!(alice.lock().unwrap().view.as_ref().unwrap().rendered().is_empty());
    }

    #[tokio::test]
    async fn poll_picks_up_messages_written_behind_the_view() {
        let dir = tempfile::tempdir().unwrap();
        let alice = signed_in_state(&dir, "alice@x", "Alice");
        let _bob = signed_in_state(&dir, "bob@x", "Bob");

        open_conversation(
            &alice,
            SelectRequest::OpenDirect {
                contact: UserId::from("bob@x"),
            },
        )
        .unwrap();
        let group = {
            let guard = alice.lock().unwrap();
            let db = guard.database.as_ref().unwrap();
            let group = guard.view.as_ref().unwrap().viewing().unwrap();
            db.insert_message(&msg(group, "bob@x", 1)).unwrap();
            group
        };

        poll_once(&alice).await.unwrap();

        let guard = alice.lock().unwrap();
        let view = guard.view.as_ref().unwrap();
        assert_eq!(view.viewing(), Some(group));
        assert_eq!(view.rendered().len(), 1);
    }

    #[tokio::test]
    async fn poll_picks_up_a_message_sharing_the_newest_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let alice = signed_in_state(&dir, "alice@x", "Alice");
        let _bob = signed_in_state(&dir, "bob@x", "Bob");

        open_conversation(
            &alice,
            SelectRequest::OpenDirect {
                contact: UserId::from("bob@x"),
            },
        )
        .unwrap();
        let group = {
            let guard = alice.lock().unwrap();
            guard.view.as_ref().unwrap().viewing().unwrap()
        };

        let sent_at = Utc::now();
        let tied = |body: &str| Message {
            group_id: group,
            author_id: UserId::from("bob@x"),
            body: body.into(),
            sent_at,
        };

        {
            let guard = alice.lock().unwrap();
            let db = guard.database.as_ref().unwrap();
            db.insert_message(&tied("first")).unwrap();
        }
        poll_once(&alice).await.unwrap();

        // Second message lands on the exact timestamp already rendered.
        {
            let guard = alice.lock().unwrap();
            let db = guard.database.as_ref().unwrap();
            db.insert_message(&tied("second")).unwrap();
        }
        poll_once(&alice).await.unwrap();

        let bodies: Vec<String> = {
            let guard = alice.lock().unwrap();
            guard
                .view
                .as_ref()
                .unwrap()
                .rendered()
                .iter()
                .map(|r| r.message.body.clone())
                .collect()
        };
        assert_eq!(bodies, ["first", "second"]);

        // A further idle cycle must not re-append the tied rows.
        poll_once(&alice).await.unwrap();
        let guard = alice.lock().unwrap();
        assert_eq!(guard.view.as_ref().unwrap().rendered().len(), 2);
    }

    #[tokio::test]
    async fn poll_follows_a_moved_active_pointer() {
        let dir = tempfile::tempdir().unwrap();
        let alice = signed_in_state(&dir, "alice@x", "Alice");

        let seed = {
            let guard = alice.lock().unwrap();
            let db = guard.database.as_ref().unwrap();
            db.active_group_of(&UserId::from("alice@x")).unwrap()
        };

        // View still shows nothing; the pointer already targets the seed
        // group, as after a pointer move from another device.
        poll_once(&alice).await.unwrap();

        let guard = alice.lock().unwrap();
        assert_eq!(guard.view.as_ref().unwrap().viewing(), Some(seed));
        assert_eq!(guard.profile.as_ref().unwrap().active_group, seed);
    }
}
