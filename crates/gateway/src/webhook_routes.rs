//! `POST /callback`: the messaging platform's webhook.
//!
//! The raw body is authenticated against `X-Line-Signature` before anything
//! is parsed. Text messages get a fixed acknowledgment through the event's
//! reply token; every other event is only logged.

use {
    axum::{
        body::Bytes,
        extract::State,
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
    },
    dailybot_line::{
        LineOutbound, SIGNATURE_HEADER, WebhookPayload, parse_payload, verify_signature,
    },
    secrecy::ExposeSecret,
    tracing::{debug, info, warn},
};

use crate::server::AppState;

/// Sent back for every inbound text message.
pub const ACK_REPLY: &str = "我收到你的訊息囉！";

pub async fn callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!("webhook rejected: missing signature header");
        return StatusCode::BAD_REQUEST.into_response();
    };

    if !verify_signature(&body, signature, state.gateway.channel_secret.expose_secret()) {
        warn!(len = body.len(), "webhook rejected: invalid signature");
        return StatusCode::BAD_REQUEST.into_response();
    }

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "webhook rejected: unparseable body");
            return StatusCode::BAD_REQUEST.into_response();
        },
    };

    let replies = handle_events(state.gateway.outbound.as_ref(), &payload).await;
    debug!(events = payload.events.len(), replies, "webhook processed");

    (StatusCode::OK, "OK").into_response()
}

/// Log each message event and acknowledge text messages.
///
/// Returns how many replies were sent successfully. A failed reply is logged
/// and does not affect the other events.
pub async fn handle_events(outbound: &dyn LineOutbound, payload: &WebhookPayload) -> usize {
    let mut replies = 0;
    for event in payload.message_events() {
        info!(
            message = ?event.message,
            timestamp = ?event.timestamp,
            "received message event"
        );
        match event.user_id() {
            Some(user_id) => info!(user_id, "message sender"),
            None => warn!("message event without a user id"),
        }

        if event.message.text().is_none() {
            continue;
        }
        let Some(reply_token) = event.reply_token.as_deref() else {
            debug!("text message without reply token, not acknowledging");
            continue;
        };
        match outbound.reply_text(reply_token, ACK_REPLY).await {
            Ok(()) => replies += 1,
            Err(e) => warn!(error = %e, "failed to send acknowledgment"),
        }
    }
    replies
}
