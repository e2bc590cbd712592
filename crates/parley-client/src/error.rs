use thiserror::Error;

/// Errors surfaced by client commands.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No user is signed in (or the session was torn down underneath the
    /// caller).
    #[error("No active session")]
    NoSession,

    /// The acting user has no conversation open.
    #[error("No conversation open")]
    NoActiveConversation,

    /// Session state mutex poisoned by a panicking thread.
    #[error("Session state poisoned")]
    StatePoisoned,

    /// Failure from the conversation core / abstract store.
    #[error(transparent)]
    Core(#[from] parley_core::StoreError),

    /// Failure from the SQLite store.
    #[error(transparent)]
    Store(#[from] parley_store::StoreError),
}
