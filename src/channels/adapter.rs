use crate::channels::types::{ChannelMessage, ChannelOutboundMessage};
use anyhow::Result;
use async_trait::async_trait;

/// A chat transport: an ordered inbound stream plus threaded replies.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    fn channel(&self) -> &'static str;

    /// Account name the transport is authorized as, when it can tell.
    async fn identity(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Waits for the next batch of inbound messages. An empty batch means
    /// the long poll timed out with nothing new.
    async fn poll_inbound(&self) -> Result<Vec<ChannelMessage>>;

    async fn send_outbound(&self, outbound: &ChannelOutboundMessage) -> Result<()>;
}
