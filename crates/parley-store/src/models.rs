//! Store-specific list-row structs.
//!
//! The domain models themselves live in `parley_core::models`; these are the
//! denormalized rows the conversation sidebar renders.

use serde::{Deserialize, Serialize};

use parley_core::{GroupId, UserId};

/// A conversation the user already belongs to, with a one-line preview of
/// the latest message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub group_id: GroupId,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub preview: Option<String>,
}

/// A contact the user could start (or resume) a direct chat with.
/// `direct_group` is [`GroupId::NONE`] when no shared direct chat exists
/// yet -- selecting such a row creates one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactSummary {
    pub user_id: UserId,
    pub name: String,
    pub avatar: Option<String>,
    pub direct_group: GroupId,
}
