//! Command functions invoked by the UI layer.
//!
//! Each command locks the shared [`crate::SessionState`], requires a signed
//! in session, and talks to the store through the handle opened at sign-in.

pub mod conversations;
pub mod messaging;
pub mod session;
