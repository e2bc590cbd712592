//! Sending messages and reading the rendered view.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use parley_core::{Message, RenderedMessage};

use crate::error::ClientError;
use crate::state::{lock_state, SessionState};

/// A rendered message as the UI consumes it: body plus the display hints
/// the sequencer computed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMessageDto {
    pub author: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub is_own: bool,
    pub starts_run: bool,
    pub ends_run: bool,
    pub show_timestamp: bool,
}

impl From<&RenderedMessage> for RenderedMessageDto {
    fn from(rendered: &RenderedMessage) -> Self {
        Self {
            author: rendered.message.author_id.as_str().to_string(),
            body: rendered.message.body.clone(),
            sent_at: rendered.message.sent_at,
            is_own: rendered.is_own,
            starts_run: rendered.starts_run,
            ends_run: rendered.ends_run,
            show_timestamp: rendered.show_timestamp,
        }
    }
}

/// Persist a message to the active conversation and return its send time.
///
/// The target group is the store-authoritative active-group pointer, not
/// whatever the pane happens to show: a send racing a navigation lands in
/// the conversation the pointer says is current.  The rendered pane picks
/// the message up through the feed rather than being patched here.
pub fn send_message(
    state: &Arc<Mutex<SessionState>>,
    body: &str,
) -> Result<DateTime<Utc>, ClientError> {
    let guard = lock_state(state)?;
    let user = guard
        .profile
        .as_ref()
        .ok_or(ClientError::NoSession)?
        .id
        .clone();
    let db = guard.database.as_ref().ok_or(ClientError::NoSession)?;

    let group = db.active_group_of(&user)?;
    if group.is_none() {
        return Err(ClientError::NoActiveConversation);
    }

    let sent_at = Utc::now();
    db.insert_message(&Message {
        group_id: group,
        author_id: user.clone(),
        body: body.to_string(),
        sent_at,
    })?;

    info!(user = %user, group = %group, "message sent");
    Ok(sent_at)
}

/// The currently rendered conversation, as display-ready rows.
pub fn current_view(
    state: &Arc<Mutex<SessionState>>,
) -> Result<Vec<RenderedMessageDto>, ClientError> {
    let guard = lock_state(state)?;
    let view = guard.view.as_ref().ok_or(ClientError::NoSession)?;
    Ok(view.rendered().iter().map(RenderedMessageDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{SelectRequest, UserId};

    use crate::commands::conversations::open_conversation;
    use crate::commands::session::sign_in;
    use crate::config::ClientConfig;

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

    #[test]
    fn send_targets_the_active_group() {
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

        send_message(&alice, "hello bob").unwrap();

        let guard = alice.lock().unwrap();
        let db = guard.database.as_ref().unwrap();
        let group = db.active_group_of(&UserId::from("alice@x")).unwrap();
        let messages = db.messages_for_group(group, None).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, "hello bob");
    }

    #[test]
    fn reopening_renders_the_sent_message_as_own() {
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
        send_message(&alice, "hello").unwrap();

        let guard = alice.lock().unwrap();
        let group = guard
            .database
            .as_ref()
            .unwrap()
            .active_group_of(&UserId::from("alice@x"))
            .unwrap();
        drop(guard);

        let rendered =
            open_conversation(&alice, SelectRequest::Switch { group }).unwrap();
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].is_own);
        assert!(rendered[0].starts_run);
        assert!(rendered[0].show_timestamp);
    }

    #[test]
    fn send_without_active_conversation_is_rejected() {
        // A hand-built session whose pointer was never bootstrapped.
        let dir = tempfile::tempdir().unwrap();
        let alice = signed_in_state(&dir, "alice@x", "Alice");

        {
            let guard = alice.lock().unwrap();
            let db = guard.database.as_ref().unwrap();
            db.set_active_group(&UserId::from("alice@x"), parley_core::GroupId::NONE)
                .unwrap();
        }

        let err = send_message(&alice, "into the void").unwrap_err();
        assert!(matches!(err, ClientError::NoActiveConversation));
    }
}
