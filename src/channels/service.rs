// 聊天机器人主循环：逐条处理入站消息，执行命令并以回复形式发回原会话。
use crate::channels::adapter::ChannelAdapter;
use crate::channels::client::TrickClient;
use crate::channels::commands::{parse_trick_fields, BotCommand};
use crate::channels::types::{ChannelMessage, ChannelOutboundMessage};
use crate::storage::TrickRecord;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

pub const REPLY_LIST_FAILED: &str = "Failed to retrieve tricks";
pub const REPLY_INSERT_FAILED: &str = "Failed to insert new trick";
pub const REPLY_NO_TRICKS: &str = "No tricks yet";
pub const REPLY_NEW_TRICK_USAGE: &str =
    "Usage: /NewTrick name, translated name, description, difficulty, progress";
pub const REPLY_DIARY_OVERVIEW: &str = "Hier kommen Garys TagebuchEinträge";
pub const REPLY_DIARY_ENTRY: &str = "Hier kannst du einen Eintrag hinzufügen";
pub const REPLY_UNKNOWN: &str = "I don't know that command";

const POLL_ERROR_DELAY_MS: u64 = 3000;

#[derive(Clone)]
pub struct TrickBot {
    client: Arc<dyn TrickClient>,
}

impl TrickBot {
    pub fn new(client: Arc<dyn TrickClient>) -> Self {
        Self { client }
    }

    /// Polls the adapter forever, answering each message before reading
    /// the next one.
    pub async fn run(&self, adapter: Arc<dyn ChannelAdapter>) {
        match adapter.identity().await {
            Ok(Some(name)) => info!("Authorized on account {name}"),
            Ok(None) => info!("{} channel started", adapter.channel()),
            Err(err) => warn!("{} identity lookup failed: {err}", adapter.channel()),
        }
        loop {
            let batch = match adapter.poll_inbound().await {
                Ok(batch) => batch,
                Err(err) => {
                    error!("{} poll failed: {err}", adapter.channel());
                    sleep(Duration::from_millis(POLL_ERROR_DELAY_MS)).await;
                    continue;
                }
            };
            for message in batch {
                self.dispatch(adapter.as_ref(), &message).await;
            }
        }
    }

    pub async fn dispatch(&self, adapter: &dyn ChannelAdapter, message: &ChannelMessage) {
        let sender = message
            .sender
            .as_ref()
            .map(|sender| sender.display_name())
            .unwrap_or("unknown");
        let text = message.text.as_deref().unwrap_or_default();
        info!("[{sender}] {text}");

        let reply = self.handle_message(message).await;
        if let Err(err) = adapter.send_outbound(&reply).await {
            warn!(
                "{} reply failed for peer {}: {err}",
                adapter.channel(),
                reply.peer.id
            );
        }
    }

    pub async fn handle_message(&self, message: &ChannelMessage) -> ChannelOutboundMessage {
        let text = message.text.as_deref().unwrap_or_default();
        let reply = match BotCommand::parse(text) {
            BotCommand::Tricks => self.list_reply().await,
            BotCommand::NewTrick { args } => self.new_trick_reply(&args).await,
            BotCommand::DiaryOverview => REPLY_DIARY_OVERVIEW.to_string(),
            BotCommand::DiaryEntry => REPLY_DIARY_ENTRY.to_string(),
            BotCommand::Unknown => REPLY_UNKNOWN.to_string(),
        };
        ChannelOutboundMessage::reply_to(message, reply)
    }

    async fn list_reply(&self) -> String {
        match self.client.list_tricks().await {
            Ok(tricks) if tricks.is_empty() => REPLY_NO_TRICKS.to_string(),
            Ok(tricks) => render_trick_list(&tricks),
            Err(err) => {
                warn!("list tricks failed: {err}");
                REPLY_LIST_FAILED.to_string()
            }
        }
    }

    async fn new_trick_reply(&self, args: &str) -> String {
        let Some(fields) = parse_trick_fields(args) else {
            return REPLY_NEW_TRICK_USAGE.to_string();
        };
        match self.client.create_trick(fields).await {
            Ok(trick) => render_created_trick(&trick),
            Err(err) => {
                warn!("insert trick failed: {err}");
                REPLY_INSERT_FAILED.to_string()
            }
        }
    }
}

pub fn render_trick_list(tricks: &[TrickRecord]) -> String {
    let mut text = String::new();
    for trick in tricks {
        let _ = writeln!(text, "Trick Name: {}", trick.name);
        let _ = writeln!(text, "Trick Description: {}", trick.description);
        let _ = writeln!(text, "Difficulty: {}", trick.difficulty);
        let _ = writeln!(text, "Progress: {}", trick.progress);
        text.push('\n');
    }
    text
}

/// Name, description, difficulty and progress joined with no separator.
pub fn render_created_trick(trick: &TrickRecord) -> String {
    [
        trick.name.as_str(),
        trick.description.as_str(),
        trick.difficulty.as_str(),
        trick.progress.as_str(),
    ]
    .concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::types::{ChannelPeer, ChannelSender};
    use crate::storage::TrickFields;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct MemoryClient {
        tricks: Mutex<Vec<TrickRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl TrickClient for MemoryClient {
        async fn list_tricks(&self) -> Result<Vec<TrickRecord>> {
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            Ok(self.tricks.lock().clone())
        }

        async fn create_trick(&self, fields: TrickFields) -> Result<TrickRecord> {
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            let mut guard = self.tricks.lock();
            let record = fields.into_record(guard.len() as i64 + 1);
            guard.push(record.clone());
            Ok(record)
        }
    }

    fn message(text: &str) -> ChannelMessage {
        ChannelMessage {
            channel: "test".to_string(),
            peer: ChannelPeer {
                id: "42".to_string(),
            },
            message_id: Some("7".to_string()),
            sender: Some(ChannelSender {
                id: "1001".to_string(),
                name: Some("gary".to_string()),
            }),
            text: Some(text.to_string()),
        }
    }

    fn bot(fail: bool) -> (Arc<MemoryClient>, TrickBot) {
        let client = Arc::new(MemoryClient {
            fail,
            ..MemoryClient::default()
        });
        (client.clone(), TrickBot::new(client))
    }

    #[tokio::test]
    async fn new_trick_then_list() {
        let (client, bot) = bot(false);
        let reply = bot
            .handle_message(&message("/NewTrick Kickflip, , basic flip, easy, learning"))
            .await;
        assert_eq!(reply.text, "Kickflipbasic flipeasylearning");
        assert_eq!(reply.reply_to.as_deref(), Some("7"));
        assert_eq!(reply.peer.id, "42");
        assert_eq!(client.tricks.lock().len(), 1);

        let reply = bot.handle_message(&message("/Tricks")).await;
        assert_eq!(
            reply.text,
            "Trick Name: Kickflip\nTrick Description: basic flip\nDifficulty: easy\nProgress: learning\n\n"
        );
    }

    #[tokio::test]
    async fn malformed_new_trick_does_not_store() {
        let (client, bot) = bot(false);
        let reply = bot.handle_message(&message("/NewTrick Kickflip, easy")).await;
        assert_eq!(reply.text, REPLY_NEW_TRICK_USAGE);
        assert!(client.tricks.lock().is_empty());
    }

    #[tokio::test]
    async fn failures_become_static_replies() {
        let (_client, bot) = bot(true);
        let reply = bot.handle_message(&message("/Tricks")).await;
        assert_eq!(reply.text, REPLY_LIST_FAILED);
        let reply = bot
            .handle_message(&message("/NewTrick Ollie, jump, easy, landed"))
            .await;
        assert_eq!(reply.text, REPLY_INSERT_FAILED);
    }

    #[tokio::test]
    async fn message_without_text_gets_unknown_reply() {
        let (_client, bot) = bot(false);
        let mut sticker = message("");
        sticker.text = None;
        let reply = bot.handle_message(&sticker).await;
        assert_eq!(reply.text, REPLY_UNKNOWN);
        assert_eq!(reply.reply_to.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn static_and_unknown_commands() {
        let (_client, bot) = bot(false);
        assert_eq!(
            bot.handle_message(&message("/TagebuchUebersicht")).await.text,
            REPLY_DIARY_OVERVIEW
        );
        assert_eq!(
            bot.handle_message(&message("/TagebuchEintrag")).await.text,
            REPLY_DIARY_ENTRY
        );
        assert_eq!(
            bot.handle_message(&message("/Skate")).await.text,
            REPLY_UNKNOWN
        );
        assert_eq!(bot.handle_message(&message("/Tricks")).await.text, REPLY_NO_TRICKS);
    }
}
