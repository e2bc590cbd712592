//! Events the client emits towards the UI layer.
//!
//! Payloads are intentionally light: ids and counts, not message bodies.
//! On receipt the UI re-queries the commands it cares about
//! (`commands::messaging::current_view`, the conversation lists).

use serde::Serialize;
use tokio::sync::mpsc;

pub const EVENT_CONVERSATION_CHANGED: &str = "conversation-changed";
pub const EVENT_MESSAGES_APPENDED: &str = "messages-appended";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationChangedPayload {
    pub group_id: i64,
    pub message_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesAppendedPayload {
    pub group_id: i64,
    pub appended: usize,
}

/// Event envelope delivered to the UI layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum UiEvent {
    #[serde(rename = "conversation-changed")]
    ConversationChanged(ConversationChangedPayload),
    #[serde(rename = "messages-appended")]
    MessagesAppended(MessagesAppendedPayload),
}

/// Forward an event to the UI channel, logging (not propagating) failures:
/// a closed UI channel must never take the feed loop down.
pub async fn emit_event(tx: &mpsc::Sender<UiEvent>, event: UiEvent) {
    if let Err(e) = tx.send(event).await {
        tracing::error!(error = %e, "Failed to emit UI event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kebab_case_tags() {
        let event = UiEvent::MessagesAppended(MessagesAppendedPayload {
            group_id: 7,
            appended: 2,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], EVENT_MESSAGES_APPENDED);
        assert_eq!(json["payload"]["groupId"], 7);
        assert_eq!(json["payload"]["appended"], 2);

        let event = UiEvent::ConversationChanged(ConversationChangedPayload {
            group_id: 3,
            message_count: 0,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], EVENT_CONVERSATION_CHANGED);
        assert_eq!(json["payload"]["messageCount"], 0);
    }
}
