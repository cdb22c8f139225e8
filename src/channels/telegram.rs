// Telegram Bot API 长轮询通道：getUpdates 拉取消息，sendMessage 回复原消息。
use crate::channels::adapter::ChannelAdapter;
use crate::channels::types::{ChannelMessage, ChannelOutboundMessage, ChannelPeer, ChannelSender};
use crate::config::TelegramConfig;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

pub const TELEGRAM_CHANNEL: &str = "telegram";
const TELEGRAM_TEXT_LIMIT: usize = 4096;
const POLL_GRACE_S: u64 = 10;

#[derive(Debug, Deserialize)]
struct TelegramEnvelope<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelegramUpdate {
    update_id: i64,
    #[serde(default)]
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
    #[serde(default)]
    from: Option<TelegramUser>,
    chat: TelegramChat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: i64,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

pub struct TelegramAdapter {
    http: Client,
    api_base: String,
    token: String,
    poll_timeout_s: u64,
    offset: AtomicI64,
}

impl TelegramAdapter {
    pub fn new(http: Client, token: String, config: &TelegramConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.trim().trim_end_matches('/').to_string(),
            token,
            poll_timeout_s: config.poll_timeout_s,
            offset: AtomicI64::new(0),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }

    async fn call<T>(&self, method: &str, payload: Value, timeout: Option<Duration>) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut request = self.http.post(self.method_url(method)).json(&payload);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        // reqwest 错误信息会携带 URL，去掉以免 token 进入日志。
        let response = request
            .send()
            .await
            .map_err(|err| anyhow!("telegram {method} failed: {}", err.without_url()))?;
        let status = response.status();
        let envelope: TelegramEnvelope<T> = response
            .json()
            .await
            .map_err(|err| anyhow!("telegram {method} decode failed: {}", err.without_url()))?;
        if !envelope.ok {
            let description = envelope.description.unwrap_or_default();
            return Err(anyhow!("telegram {method} rejected: {status} {description}"));
        }
        envelope
            .result
            .ok_or_else(|| anyhow!("telegram {method} returned no result"))
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn channel(&self) -> &'static str {
        TELEGRAM_CHANNEL
    }

    async fn identity(&self) -> Result<Option<String>> {
        let me: Value = self.call("getMe", json!({}), None).await?;
        Ok(me
            .get("username")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn poll_inbound(&self) -> Result<Vec<ChannelMessage>> {
        let offset = self.offset.load(Ordering::SeqCst);
        let payload = json!({
            "offset": offset,
            "timeout": self.poll_timeout_s,
            "allowed_updates": ["message"],
        });
        let timeout = Duration::from_secs(self.poll_timeout_s + POLL_GRACE_S);
        let updates: Vec<TelegramUpdate> = self.call("getUpdates", payload, Some(timeout)).await?;
        if let Some(next) = next_offset(&updates) {
            self.offset.fetch_max(next, Ordering::SeqCst);
        }
        Ok(updates.into_iter().filter_map(to_channel_message).collect())
    }

    async fn send_outbound(&self, outbound: &ChannelOutboundMessage) -> Result<()> {
        let reply_to = outbound
            .reply_to
            .as_deref()
            .and_then(|value| value.trim().parse::<i64>().ok());
        for chunk in split_text(&outbound.text, TELEGRAM_TEXT_LIMIT) {
            let mut payload = json!({
                "chat_id": outbound.peer.id,
                "text": chunk,
            });
            if let Some(message_id) = reply_to {
                payload["reply_to_message_id"] = json!(message_id);
            }
            let _: Value = self.call("sendMessage", payload, None).await?;
        }
        Ok(())
    }
}

pub(crate) fn next_offset(updates: &[TelegramUpdate]) -> Option<i64> {
    updates.iter().map(|update| update.update_id + 1).max()
}

/// Every `message` update is forwarded, including ones without text
/// (stickers, photos), so each gets a reply.
fn to_channel_message(update: TelegramUpdate) -> Option<ChannelMessage> {
    let message = update.message?;
    let sender = message.from.map(|user| ChannelSender {
        id: user.id.to_string(),
        name: user.username.or(user.first_name),
    });
    Some(ChannelMessage {
        channel: TELEGRAM_CHANNEL.to_string(),
        peer: ChannelPeer {
            id: message.chat.id.to_string(),
        },
        message_id: Some(message.message_id.to_string()),
        sender,
        text: message.text,
    })
}

/// Splits on line boundaries so each piece fits Telegram's message limit.
/// Lengths are counted in UTF-16 code units, as Telegram counts them.
pub(crate) fn split_text(text: &str, limit: usize) -> Vec<String> {
    if utf16_len(text) <= limit {
        return vec![text.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for line in text.split_inclusive('\n') {
        let line_len = utf16_len(line);
        if current_len + line_len > limit && current_len > 0 {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }
        for ch in line.chars() {
            let width = ch.len_utf16();
            if current_len + width > limit && current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += width;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
