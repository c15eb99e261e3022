//! Inbound webhook event model.
//!
//! Only the fields the bot acts on are modelled; unknown event and message
//! types deserialize into catch-all variants instead of failing the whole
//! request.

use serde::Deserialize;

use crate::Result;

/// Top-level webhook request body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// User ID of the bot that should receive the events.
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

impl WebhookPayload {
    /// Iterate over message events, skipping follows, postbacks, etc.
    pub fn message_events(&self) -> impl Iterator<Item = &MessageEvent> {
        self.events.iter().filter_map(|event| match event {
            WebhookEvent::Message(msg) => Some(msg),
            WebhookEvent::Other => None,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent on events delivered while the channel is in standby mode.
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    pub message: MessageContent,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Where an event originated.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventSource {
    User {
        #[serde(rename = "userId")]
        user_id: Option<String>,
    },
    Group {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "userId")]
        user_id: Option<String>,
    },
    Room {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "userId")]
        user_id: Option<String>,
    },
}

impl EventSource {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User { user_id } | Self::Group { user_id, .. } | Self::Room { user_id, .. } => {
                user_id.as_deref()
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text { id: String, text: String },
    /// Stickers, images, locations and every other non-text kind.
    #[serde(other)]
    Other,
}

impl MessageContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Other => None,
        }
    }
}

impl MessageEvent {
    pub fn user_id(&self) -> Option<&str> {
        self.source.as_ref().and_then(EventSource::user_id)
    }
}

/// Parse a raw webhook body.
pub fn parse_payload(body: &[u8]) -> Result<WebhookPayload> {
    Ok(serde_json::from_slice(body)?)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_message_event() {
        let body = br#"{
            "destination": "Ubot",
            "events": [{
                "type": "message",
                "mode": "active",
                "timestamp": 1462629479859,
                "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
                "source": {"type": "user", "userId": "U4af4980629"},
                "webhookEventId": "01FZ74A0TDDPYRVKNK77XKC3ZR",
                "message": {"id": "444573844083572737", "type": "text", "text": "hello"}
            }]
        }"#;
        let payload = parse_payload(body).unwrap();
        assert_eq!(payload.destination.as_deref(), Some("Ubot"));
        let events: Vec<_> = payload.message_events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].reply_token.as_deref(),
            Some("nHuyWiB7yP5Zw52FIkcQobQuGDXCTA")
        );
        assert_eq!(events[0].user_id(), Some("U4af4980629"));
        assert_eq!(events[0].message.text(), Some("hello"));
    }

    #[test]
    fn sticker_is_other_message() {
        let body = br#"{"events": [{
            "type": "message",
            "replyToken": "rt",
            "source": {"type": "user", "userId": "U1"},
            "message": {"id": "1", "type": "sticker", "packageId": "1", "stickerId": "1"}
        }]}"#;
        let payload = parse_payload(body).unwrap();
        let event = payload.message_events().next().unwrap();
        assert!(matches!(event.message, MessageContent::Other));
        assert_eq!(event.message.text(), None);
    }

    #[test]
    fn non_message_events_are_skipped() {
        let body = br#"{"events": [
            {"type": "follow", "replyToken": "rt", "source": {"type": "user", "userId": "U1"}},
            {"type": "unfollow", "source": {"type": "user", "userId": "U1"}}
        ]}"#;
        let payload = parse_payload(body).unwrap();
        assert_eq!(payload.events.len(), 2);
        assert_eq!(payload.message_events().count(), 0);
    }

    #[test]
    fn group_source_exposes_user_id() {
        let body = br#"{"events": [{
            "type": "message",
            "replyToken": "rt",
            "source": {"type": "group", "groupId": "G1", "userId": "U9"},
            "message": {"id": "1", "type": "text", "text": "hi"}
        }]}"#;
        let payload = parse_payload(body).unwrap();
        let event = payload.message_events().next().unwrap();
        assert_eq!(event.user_id(), Some("U9"));
    }

    #[test]
    fn standby_event_has_no_reply_token() {
        let body = br#"{"events": [{
            "type": "message",
            "mode": "standby",
            "source": {"type": "user", "userId": "U1"},
            "message": {"id": "1", "type": "text", "text": "hi"}
        }]}"#;
        let payload = parse_payload(body).unwrap();
        let event = payload.message_events().next().unwrap();
        assert!(event.reply_token.is_none());
        assert_eq!(event.message.text(), Some("hi"));
    }

    #[test]
    fn empty_events_list() {
        let payload = parse_payload(br#"{"destination": "U0", "events": []}"#).unwrap();
        assert!(payload.events.is_empty());
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_payload(b"not json").is_err());
    }
}
