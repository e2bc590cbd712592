//! # parley-store
//!
//! SQLite-backed [`parley_core::ConversationStore`] implementation.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for every domain
//! table, plus the conversation-list queries the client sidebar needs.  It
//! stands in for the hosted backend the conversation core was written
//! against: any other store satisfying the trait works the same.

pub mod database;
pub mod groups;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod participants;
pub mod store_impl;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::{ContactSummary, ConversationSummary};
