//! Community events, shared by the long poll and the Callback API.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// One community event envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub object: Value,
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Only present on Callback API requests.
    #[serde(default)]
    pub secret: Option<String>,
}

/// A private message sent to the community.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncomingMessage {
    pub from_id: i64,
    pub peer_id: i64,
    #[serde(default)]
    pub text: String,
    /// Button payload, a JSON string such as `{"command":"start"}`.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Deserialize)]
struct MessageNew {
    message: IncomingMessage,
}

#[derive(Deserialize)]
struct ButtonPayload {
    command: String,
}

impl GroupEvent {
    /// Extract the user message from a `message_new` event.
    ///
    /// Other event types, messages from communities and messages without
    /// text or command payload yield `None`.
    pub fn into_message(self) -> Option<IncomingMessage> {
        if self.kind != "message_new" {
            debug!("Ignoring VK event '{}'", self.kind);
            return None;
        }

        let message = match serde_json::from_value::<MessageNew>(self.object) {
            Ok(wrapper) => wrapper.message,
            Err(e) => {
                debug!("Unreadable message_new object: {}", e);
                return None;
            }
        };

        if message.from_id <= 0 {
            return None;
        }
        if message.command().is_empty() {
            debug!("Ignoring message without text from {}", message.from_id);
            return None;
        }

        Some(message)
    }
}

impl IncomingMessage {
    /// The command this message carries: the button payload if present,
    /// otherwise the typed text.
    pub fn command(&self) -> String {
        self.payload
            .as_deref()
            .and_then(|raw| serde_json::from_str::<ButtonPayload>(raw).ok())
            .map(|p| p.command)
            .unwrap_or_else(|| self.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(raw: &str) -> GroupEvent {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_message_new_is_extracted() {
        let msg = event(
            r#"{"type": "message_new", "group_id": 1, "event_id": "x",
                "object": {"message": {"from_id": 5, "peer_id": 5, "text": "Найти пару", "id": 10},
                           "client_info": {}}}"#,
        )
        .into_message()
        .unwrap();
        assert_eq!(msg.from_id, 5);
        assert_eq!(msg.command(), "Найти пару");
    }

    #[test]
    fn test_payload_wins_over_text() {
        let msg = IncomingMessage {
            from_id: 5,
            peer_id: 5,
            text: "Начать".to_string(),
            payload: Some(r#"{"command":"start"}"#.to_string()),
        };
        assert_eq!(msg.command(), "start");
    }

    #[test]
    fn test_broken_payload_falls_back_to_text() {
        let msg = IncomingMessage {
            from_id: 5,
            peer_id: 5,
            text: " помощь ".to_string(),
            payload: Some("{\"button\":\"1\"}".to_string()),
        };
        assert_eq!(msg.command(), "помощь");
    }

    #[test]
    fn test_other_events_are_ignored() {
        assert!(event(r#"{"type": "message_typing_state", "object": {}}"#)
            .into_message()
            .is_none());
        assert!(event(r#"{"type": "confirmation", "group_id": 1}"#)
            .into_message()
            .is_none());
    }

    #[test]
    fn test_empty_and_community_messages_are_ignored() {
        let empty = r#"{"type": "message_new",
                        "object": {"message": {"from_id": 5, "peer_id": 5, "text": ""}}}"#;
        assert!(event(empty).into_message().is_none());

        let community = r#"{"type": "message_new",
                            "object": {"message": {"from_id": -3, "peer_id": 5, "text": "hi"}}}"#;
        assert!(event(community).into_message().is_none());
    }
}
