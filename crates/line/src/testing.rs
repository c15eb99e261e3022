//! In-memory [`LineOutbound`] that records every message instead of sending
//! it. Used by tests across the workspace.

use std::sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use crate::{Error, LineOutbound, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Push { to: String, text: String },
    Reply { reply_token: String, text: String },
}

#[derive(Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<SentMessage>>,
    fail: AtomicBool,
}

impl RecordingOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail with a 500 from the "API".
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, message: SentMessage) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Api {
                status: 500,
                body: "simulated failure".into(),
            });
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
        Ok(())
    }
}

#[async_trait]
impl LineOutbound for RecordingOutbound {
    async fn push_text(&self, to: &str, text: &str) -> Result<()> {
        self.record(SentMessage::Push {
            to: to.into(),
            text: text.into(),
        })
    }

    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()> {
        self.record(SentMessage::Reply {
            reply_token: reply_token.into(),
            text: text.into(),
        })
    }
}
