//! Session state shared across all client commands.
//!
//! The [`SessionState`] struct is wrapped in `Arc<Mutex<>>` and handed to
//! every command and to the feed loop.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use parley_core::{ChatView, User};
use parley_store::Database;

use crate::error::ClientError;
use crate::events::UiEvent;

/// Central session state.
///
/// The database handle is opened once at sign-in and dropped at sign-out;
/// commands borrow it under the lock, they never open their own connection.
pub struct SessionState {
    /// The signed-in user's profile.  `None` until sign-in completes.
    pub profile: Option<User>,

    /// Long-lived handle to the local store.
    /// `None` until sign-in opens it.
    pub database: Option<Database>,

    /// View state machine for the message pane.
    pub view: Option<ChatView>,

    /// Sender half of the channel UI-facing events are emitted on.
    pub ui_tx: Option<mpsc::Sender<UiEvent>>,
}

impl SessionState {
    /// Create a new, signed-out session state.
    pub fn new() -> Self {
        Self {
            profile: None,
            database: None,
            view: None,
            ui_tx: None,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock the session state, mapping a poisoned mutex to a typed error.
pub fn lock_state(
    state: &Arc<Mutex<SessionState>>,
) -> Result<MutexGuard<'_, SessionState>, ClientError> {
    state.lock().map_err(|_| ClientError::StatePoisoned)
}
