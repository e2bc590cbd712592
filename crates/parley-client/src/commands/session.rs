//! Sign-in bootstrap and sign-out teardown.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::info;

use parley_core::{ChatView, User, UserId};
use parley_store::Database;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::state::{lock_state, SessionState};

/// Open the store and establish a session for `id`.
///
/// First sign-in bootstraps the user: the profile row is created (or its
/// name/avatar refreshed), and a personal seed group -- a room with the
/// user as sole participant -- is created and made active so the message
/// pane is never pointed at nothing.  Subsequent sign-ins find the existing
/// seed group and leave the active-group pointer wherever the user left it.
pub fn sign_in(
    state: &Arc<Mutex<SessionState>>,
    config: &ClientConfig,
    id: UserId,
    name: &str,
    avatar: Option<&str>,
) -> Result<User, ClientError> {
    let db = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };

    db.upsert_user(&id, name, avatar)?;
    let mut user = db.get_user(&id)?;

    if user.active_group.is_none() {
        let seed = match db.find_seed_group(&id)? {
            Some(group) => group,
            None => {
                let group = db.create_group(Some(name), avatar, false)?;
                db.add_participant(group, &id, Utc::now())?;
                info!(user = %id, group = %group, "created seed group");
                group
            }
        };
        db.set_active_group(&id, seed)?;
        user.active_group = seed;
    }

    let mut guard = lock_state(state)?;
    guard.database = Some(db);
    guard.view = Some(ChatView::new(id.clone()));
    guard.profile = Some(user.clone());

    info!(user = %id, active_group = %user.active_group, "signed in");
    Ok(user)
}

/// Tear the session down: drop the store handle, the view state and the UI
/// channel.  The feed loop notices the missing session and idles.
pub fn sign_out(state: &Arc<Mutex<SessionState>>) -> Result<(), ClientError> {
    let mut guard = lock_state(state)?;

    let user = guard.profile.take().map(|u| u.id);
    if let Some(view) = guard.view.as_mut() {
        view.reset();
    }
    guard.view = None;
    guard.database = None;
    guard.ui_tx = None;

    info!(user = ?user.as_ref().map(|u| u.as_str()), "signed out");
    Ok(())
}
