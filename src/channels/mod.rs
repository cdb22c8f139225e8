pub mod adapter;
pub mod client;
pub mod commands;
pub mod service;
pub mod telegram;
pub mod types;

pub use service::TrickBot;
pub use types::ChannelMessage;

use crate::channels::adapter::ChannelAdapter;
use crate::channels::client::{HttpTrickClient, LocalTrickClient, TrickClient};
use crate::channels::telegram::TelegramAdapter;
use crate::state::AppState;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the Telegram bot from config. Returns `None` when the channel is
/// disabled or no token is configured.
pub fn build_telegram_bot(state: &AppState) -> Option<(TrickBot, Arc<dyn ChannelAdapter>)> {
    let config = &state.config.channels.telegram;
    if !config.enabled {
        info!("telegram channel disabled");
        return None;
    }
    let Some(token) = config.bot_token() else {
        warn!("telegram bot token missing, chat adapter not started");
        return None;
    };
    let http = reqwest::Client::new();
    let client: Arc<dyn TrickClient> = match config.api_base_url() {
        Some(base_url) => {
            info!("telegram bot uses trick API at {base_url}");
            Arc::new(HttpTrickClient::new(http.clone(), base_url))
        }
        None => Arc::new(LocalTrickClient::new(state.tricks.clone())),
    };
    let adapter: Arc<dyn ChannelAdapter> = Arc::new(TelegramAdapter::new(http, token, config));
    Some((TrickBot::new(client), adapter))
}
