use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde_json::json,
    tracing::debug,
};

use crate::{Error, Result};

/// Maximum length of a single text message accepted by the Messaging API,
/// counted in UTF-16 code units.
pub const MAX_TEXT_UNITS: usize = 5000;

/// Send text messages through the messaging platform.
#[async_trait]
pub trait LineOutbound: Send + Sync {
    /// Push a message to a user without an inbound trigger.
    async fn push_text(&self, to: &str, text: &str) -> Result<()>;

    /// Answer a specific inbound event using its reply token.
    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()>;
}

/// Messaging API client authenticated with a channel access token.
#[derive(Clone)]
pub struct LineClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Secret<String>,
}

impl LineClient {
    pub fn new(http: reqwest::Client, access_token: Secret<String>) -> Self {
        Self {
            http,
            base_url: "https://api.line.me".into(),
            access_token,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_message(&self, path: &str, body: serde_json::Value) -> Result<()> {
        let url = format!("{}{path}", self.base_url.trim_end_matches('/'));
        debug!(%url, "sending LINE message");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|source| Error::external("LINE request failed", source))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }
        Ok(())
    }
}

/// Cut `text` to at most [`MAX_TEXT_UNITS`] UTF-16 units without splitting a
/// character.
fn truncate_utf16(text: &str) -> &str {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > MAX_TEXT_UNITS {
            return &text[..idx];
        }
    }
    text
}

fn text_messages(text: &str) -> serde_json::Value {
    json!([{ "type": "text", "text": truncate_utf16(text) }])
}

#[async_trait]
impl LineOutbound for LineClient {
    async fn push_text(&self, to: &str, text: &str) -> Result<()> {
        self.post_message(
            "/v2/bot/message/push",
            json!({ "to": to, "messages": text_messages(text) }),
        )
        .await
    }

    async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()> {
        self.post_message(
            "/v2/bot/message/reply",
            json!({ "replyToken": reply_token, "messages": text_messages(text) }),
        )
        .await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, mockito::Matcher};

    fn client(server: &mockito::Server) -> LineClient {
        LineClient::new(reqwest::Client::new(), Secret::new("token-123".into()))
            .with_base_url(server.url())
    }

    #[tokio::test]
    async fn push_posts_text_to_recipient() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/bot/message/push")
            .match_header("authorization", "Bearer token-123")
            .match_body(Matcher::Json(json!({
                "to": "U123",
                "messages": [{"type": "text", "text": "☀️ 早安"}]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client(&server).push_text("U123", "☀️ 早安").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn reply_uses_reply_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/bot/message/reply")
            .match_body(Matcher::Json(json!({
                "replyToken": "rt-1",
                "messages": [{"type": "text", "text": "我收到你的訊息囉！"}]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        client(&server)
            .reply_text("rt-1", "我收到你的訊息囉！")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_error_surfaces_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2/bot/message/reply")
            .with_status(400)
            .with_body(r#"{"message":"Invalid reply token"}"#)
            .create_async()
            .await;

        let err = client(&server)
            .reply_text("expired", "hi")
            .await
            .unwrap_err();
        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid reply token"));
            },
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "字".repeat(MAX_TEXT_UNITS + 10);
        let messages = text_messages(&long);
        let text = messages[0]["text"].as_str().unwrap();
        assert_eq!(text.chars().count(), MAX_TEXT_UNITS);
    }

    #[test]
    fn emoji_count_as_two_units() {
        // Each 📈 is a surrogate pair.
        let long = "📈".repeat(MAX_TEXT_UNITS);
        let text = truncate_utf16(&long);
        assert_eq!(text.encode_utf16().count(), MAX_TEXT_UNITS);
        assert_eq!(text.chars().count(), MAX_TEXT_UNITS / 2);
    }

    #[test]
    fn odd_boundary_does_not_split_a_pair() {
        let long = format!("a{}", "📈".repeat(MAX_TEXT_UNITS));
        let text = truncate_utf16(&long);
        assert_eq!(text.encode_utf16().count(), MAX_TEXT_UNITS - 1);
        assert!(text.ends_with('📈'));
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_utf16("☀️ 早安"), "☀️ 早安");
    }
}
