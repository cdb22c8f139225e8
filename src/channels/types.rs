use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPeer {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSender {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl ChannelSender {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub channel: String,
    pub peer: ChannelPeer,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub sender: Option<ChannelSender>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelOutboundMessage {
    pub channel: String,
    pub peer: ChannelPeer,
    /// Source message this reply is threaded under.
    #[serde(default)]
    pub reply_to: Option<String>,
    pub text: String,
}

impl ChannelOutboundMessage {
    pub fn reply_to(message: &ChannelMessage, text: impl Into<String>) -> Self {
        Self {
            channel: message.channel.clone(),
            peer: message.peer.clone(),
            reply_to: message.message_id.clone(),
            text: text.into(),
        }
    }
}
