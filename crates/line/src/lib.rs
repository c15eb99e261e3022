//! LINE Messaging API adapter.
//!
//! Webhook signature verification, the inbound event model, and an outbound
//! client for push and reply messages.

pub mod error;
pub mod outbound;
pub mod signature;
pub mod testing;
pub mod types;

pub use {
    error::{Error, Result},
    outbound::{LineClient, LineOutbound},
    signature::{SIGNATURE_HEADER, sign, verify_signature},
    types::{EventSource, MessageContent, MessageEvent, WebhookEvent, WebhookPayload, parse_payload},
};
