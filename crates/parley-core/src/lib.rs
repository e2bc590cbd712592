//! # parley-core
//!
//! Backend-agnostic conversation logic for the Parley chat client: deciding
//! which group becomes active when the user selects a contact or an existing
//! conversation ([`GroupResolver`]), and turning a flat time-ordered message
//! stream into a display sequence with author runs and timestamp visibility
//! ([`MessageSequencer`]).
//!
//! The crate never talks to a concrete backend.  Everything it needs from
//! persistence is expressed through the [`ConversationStore`] trait; callers
//! plug in whatever store they have (the workspace ships a SQLite one in
//! `parley-store` and an in-memory one in [`memory`]).

pub mod constants;
pub mod memory;
pub mod models;
pub mod resolver;
pub mod sequencer;
pub mod session;
pub mod store;
pub mod types;

mod error;

pub use error::{Result, StoreError};
pub use models::{Group, GroupInfo, Message, Participant, RenderedMessage, User};
pub use resolver::{GroupResolver, ResolutionPlan, SelectRequest};
pub use sequencer::MessageSequencer;
pub use session::{ApplyOutcome, ChatView, ViewState};
pub use store::{AddOutcome, ConversationStore};
pub use types::{GroupId, UserId};
