use serde::Deserialize;
use serde_json::Value;

/// Reply token LINE sends with the console "Verify" request. It cannot be
/// replied to.
pub const VERIFY_REPLY_TOKEN: &str = "00000000000000000000000000000000";

/// Raw webhook body. Events are kept as JSON values so that one event with
/// an unexpected shape does not reject the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    /// Bot user id the delivery is addressed to; recorded on the delivery span
    #[serde(default)]
    pub destination: Option<String>,
    pub events: Vec<Value>,
}

impl WebhookBody {
    /// Decode every event, skipping the ones that do not parse
    pub fn decode_events(self) -> Vec<WebhookEvent> {
        self.events
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| match serde_json::from_value(raw) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Skipping undecodable webhook event #{}: {}", index, e);
                    None
                }
            })
            .collect()
    }
}

/// A single webhook event
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message {
        #[serde(rename = "replyToken", default)]
        reply_token: Option<String>,
        message: MessageContent,
    },
    #[serde(other)]
    Other,
}

impl WebhookEvent {
    /// Reply token usable for a reply call, if any
    pub fn reply_token(&self) -> Option<&str> {
        match self {
            WebhookEvent::Message { reply_token, .. } => reply_token
                .as_deref()
                .filter(|token| !token.is_empty() && *token != VERIFY_REPLY_TOKEN),
            WebhookEvent::Other => None,
        }
    }
}

/// Message payload of a message event
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text { id: String, text: String },
    Image { id: String },
    #[serde(other)]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_mixed_batch() {
        let body: WebhookBody = serde_json::from_value(json!({
            "destination": "Uabc",
            "events": [
                {"type": "message", "replyToken": "r1", "message": {"type": "image", "id": "100"}},
                {"type": "message", "replyToken": "r2", "message": {"type": "text", "id": "101", "text": "ประวัติ"}},
                {"type": "message", "replyToken": "r3", "message": {"type": "sticker", "id": "102", "packageId": "1"}},
                {"type": "follow", "replyToken": "r4"},
                {"type": "message", "replyToken": "r5"}
            ]
        }))
        .unwrap();

        let events = body.decode_events();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            WebhookEvent::Message {
                reply_token: Some("r1".to_string()),
                message: MessageContent::Image { id: "100".to_string() },
            }
        );
        assert!(matches!(
            &events[1],
            WebhookEvent::Message { message: MessageContent::Text { text, .. }, .. } if text == "ประวัติ"
        ));
        assert!(matches!(
            &events[2],
            WebhookEvent::Message { message: MessageContent::Unsupported, .. }
        ));
        assert_eq!(events[3], WebhookEvent::Other);
    }

    #[test]
    fn test_verify_token_is_not_replyable() {
        let event = WebhookEvent::Message {
            reply_token: Some(VERIFY_REPLY_TOKEN.to_string()),
            message: MessageContent::Text { id: "1".into(), text: "hi".into() },
        };
        assert!(event.reply_token().is_none());
        assert!(WebhookEvent::Other.reply_token().is_none());
    }

    #[test]
    fn test_empty_batch() {
        let body: WebhookBody = serde_json::from_str(r#"{"destination":"U1","events":[]}"#).unwrap();
        assert_eq!(body.destination.as_deref(), Some("U1"));
        assert!(body.decode_events().is_empty());

        let body: WebhookBody = serde_json::from_str(r#"{"events":[]}"#).unwrap();
        assert!(body.destination.is_none());
    }
}
