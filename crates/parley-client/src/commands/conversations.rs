//! Conversation sidebar: lists and selection.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::debug;

use parley_core::{GroupResolver, SelectRequest};
use parley_store::{ContactSummary, ConversationSummary};

use crate::commands::messaging::RenderedMessageDto;
use crate::error::ClientError;
use crate::state::{lock_state, SessionState};

/// Conversations the signed-in user belongs to, filtered by name substring.
pub fn list_conversations(
    state: &Arc<Mutex<SessionState>>,
    filter: &str,
    limit: u32,
) -> Result<Vec<ConversationSummary>, ClientError> {
    let guard = lock_state(state)?;
    let user = &guard.profile.as_ref().ok_or(ClientError::NoSession)?.id;
    let db = guard.database.as_ref().ok_or(ClientError::NoSession)?;

    Ok(db.list_conversations(user, filter, limit)?)
}

/// Other users the signed-in user could chat with.
pub fn list_contacts(
    state: &Arc<Mutex<SessionState>>,
    filter: &str,
    limit: u32,
) -> Result<Vec<ContactSummary>, ClientError> {
    let guard = lock_state(state)?;
    let user = &guard.profile.as_ref().ok_or(ClientError::NoSession)?.id;
    let db = guard.database.as_ref().ok_or(ClientError::NoSession)?;

    Ok(db.list_contacts(user, filter, limit)?)
}

/// Act on a sidebar selection: resolve it to a group (creating or forking
/// one when the selection requires it), point the message pane at it, and
/// return the freshly rendered conversation.
pub fn open_conversation(
    state: &Arc<Mutex<SessionState>>,
    request: SelectRequest,
) -> Result<Vec<RenderedMessageDto>, ClientError> {
    let now = Utc::now();
    let mut guard = lock_state(state)?;
    let session = &mut *guard;

    let db = session.database.as_ref().ok_or(ClientError::NoSession)?;
    let user = session
        .profile
        .as_ref()
        .ok_or(ClientError::NoSession)?
        .id
        .clone();

    let active = db.active_group_of(&user)?;
    let resolver = GroupResolver::new(db, user.clone());
    let resolved = resolver.resolve(active, request, now)?;

    if let Some(profile) = session.profile.as_mut() {
        profile.active_group = resolved;
    }

    let view = session.view.as_mut().ok_or(ClientError::NoSession)?;
    let rendered = view.activate(db, resolved, now)?;
    debug!(user = %user, group = %resolved, messages = rendered.len(), "opened conversation");
    Ok(rendered.iter().map(RenderedMessageDto::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::UserId;

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
    fn open_direct_from_contact_list() {
        let dir = tempfile::tempdir().unwrap();
        let alice = signed_in_state(&dir, "alice@x", "Alice");
        let _bob = signed_in_state(&dir, "bob@x", "Bob");

        let contacts = list_contacts(&alice, "", 10).unwrap();
        let bob_row = contacts
            .iter()
            .find(|c| c.user_id == UserId::from("bob@x"))
            .unwrap();
        assert!(bob_row.direct_group.is_none());

        let rendered = open_conversation(
            &alice,
            SelectRequest::OpenDirect {
                contact: bob_row.user_id.clone(),
            },
        )
        .unwrap();
        assert!(rendered.is_empty());

        // The contact row now points at the created chat.
        let contacts = list_contacts(&alice, "", 10).unwrap();
        let bob_row = contacts
            .iter()
            .find(|c| c.user_id == UserId::from("bob@x"))
            .unwrap();
        assert!(!bob_row.direct_group.is_none());
    }

    #[test]
    fn seed_group_appears_in_conversation_list() {
        let dir = tempfile::tempdir().unwrap();
        let alice = signed_in_state(&dir, "alice@x", "Alice");

        let conversations = list_conversations(&alice, "", 10).unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn commands_require_a_session() {
        let state = Arc::new(Mutex::new(SessionState::new()));
        let err = list_conversations(&state, "", 10).unwrap_err();
        assert!(matches!(err, ClientError::NoSession));
    }
}
