use thiserror::Error;

/// Errors surfaced by a [`crate::ConversationStore`] implementation.
///
/// The taxonomy is deliberately small: a store call either failed in a way
/// that a retry (with backoff) may fix, or it named something that does not
/// exist.  "Already a member" is not an error -- see
/// [`crate::store::AddOutcome`].  Stale-snapshot discards are not errors
/// either; they are an outcome of [`crate::ChatView::apply_incoming`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// Network / backend failure.  Retryable; the UI shows a "not sent"
    /// style state and the caller may re-invoke the whole operation.
    #[error("Transient store failure: {0}")]
    Transient(String),

    /// The target user or group does not exist.  User-visible, no retry.
    #[error("Record not found")]
    NotFound,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
