use anyhow::Result;
use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use trick_tracker::channels::adapter::ChannelAdapter;
use trick_tracker::channels::client::{HttpTrickClient, LocalTrickClient, TrickClient};
use trick_tracker::channels::telegram::TelegramAdapter;
use trick_tracker::channels::types::{
    ChannelMessage, ChannelOutboundMessage, ChannelPeer, ChannelSender,
};
use trick_tracker::config::{Config, TelegramConfig};
use trick_tracker::state::AppState;
use trick_tracker::TrickBot;

const TOKEN: &str = "123-test-token";

fn test_state() -> (TempDir, Arc<AppState>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = Config::default();
    config.storage.db_path = dir.path().join("tricks.db").to_string_lossy().to_string();
    let state = Arc::new(AppState::new(config).expect("app state"));
    (dir, state)
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

#[derive(Default)]
struct RecordingAdapter {
    sent: Mutex<Vec<ChannelOutboundMessage>>,
}

#[async_trait]
impl ChannelAdapter for RecordingAdapter {
    fn channel(&self) -> &'static str {
        "recording"
    }

    async fn poll_inbound(&self) -> Result<Vec<ChannelMessage>> {
        Ok(Vec::new())
    }

    async fn send_outbound(&self, outbound: &ChannelOutboundMessage) -> Result<()> {
        self.sent.lock().push(outbound.clone());
        Ok(())
    }
}

fn inbound(message_id: &str, text: &str) -> ChannelMessage {
    ChannelMessage {
        channel: "recording".to_string(),
        peer: ChannelPeer {
            id: "42".to_string(),
        },
        message_id: Some(message_id.to_string()),
        sender: Some(ChannelSender {
            id: "1001".to_string(),
            name: Some("gary".to_string()),
        }),
        text: Some(text.to_string()),
    }
}

#[tokio::test]
async fn local_client_round_trip_is_threaded() {
    let (_dir, state) = test_state();
    let client: Arc<dyn TrickClient> = Arc::new(LocalTrickClient::new(state.tricks.clone()));
    let bot = TrickBot::new(client);
    let adapter = RecordingAdapter::default();

    bot.dispatch(
        &adapter,
        &inbound("10", "/NewTrick Kickflip, , basic flip, easy, learning"),
    )
    .await;
    bot.dispatch(&adapter, &inbound("11", "/Tricks")).await;

    let sent = adapter.sent.lock().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].reply_to.as_deref(), Some("10"));
    assert_eq!(sent[0].text, "Kickflipbasic flipeasylearning");
    assert_eq!(sent[1].reply_to.as_deref(), Some("11"));
    assert_eq!(
        sent[1].text,
        "Trick Name: Kickflip\nTrick Description: basic flip\nDifficulty: easy\nProgress: learning\n\n"
    );

    let stored = state.tricks.list().await.expect("list");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, 1);
}

#[tokio::test]
async fn http_client_talks_to_the_api() {
    let (_dir, state) = test_state();
    let base_url = serve(trick_tracker::build_router(state.clone())).await;
    let client = HttpTrickClient::new(reqwest::Client::new(), &base_url);

    assert!(client.list_tricks().await.expect("list").is_empty());
    let created = client
        .create_trick(trick_tracker::storage::TrickFields {
            name: "Ollie".to_string(),
            description: "jump".to_string(),
            difficulty: "easy".to_string(),
            progress: "landed".to_string(),
            ..Default::default()
        })
        .await
        .expect("create");
    assert_eq!(created.id, 1);
    assert_eq!(created.name, "Ollie");

    let listed = client.list_tricks().await.expect("list");
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn http_client_reports_unreachable_api() {
    let client = HttpTrickClient::new(reqwest::Client::new(), "http://127.0.0.1:9");
    assert!(client.list_tricks().await.is_err());
}

#[derive(Default)]
struct FakeTelegram {
    polls: Mutex<Vec<Value>>,
    sent: Mutex<Vec<Value>>,
}

async fn fake_get_updates(
    State(fake): State<Arc<FakeTelegram>>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    let first = {
        let mut polls = fake.polls.lock();
        polls.push(payload);
        polls.len() == 1
    };
    if first {
        Json(json!({
            "ok": true,
            "result": [{
                "update_id": 500,
                "message": {
                    "message_id": 77,
                    "from": { "id": 1001, "username": "gary" },
                    "chat": { "id": 42, "type": "private" },
                    "text": "/TagebuchUebersicht"
                }
            }, {
                "update_id": 501,
                "message": {
                    "message_id": 80,
                    "chat": { "id": 42, "type": "private" },
                    "sticker": { "file_id": "skateboard" }
                }
            }]
        }))
    } else {
        Json(json!({ "ok": true, "result": [] }))
    }
}

async fn fake_send_message(
    State(fake): State<Arc<FakeTelegram>>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    fake.sent.lock().push(payload);
    Json(json!({ "ok": true, "result": { "message_id": 78 } }))
}

async fn fake_get_me() -> Json<Value> {
    Json(json!({ "ok": true, "result": { "id": 1, "is_bot": true, "username": "garys_bot" } }))
}

#[tokio::test]
async fn telegram_adapter_polls_and_replies() {
    let fake = Arc::new(FakeTelegram::default());
    let router = Router::new()
        .route(&format!("/bot{TOKEN}/getUpdates"), post(fake_get_updates))
        .route(&format!("/bot{TOKEN}/sendMessage"), post(fake_send_message))
        .route(&format!("/bot{TOKEN}/getMe"), post(fake_get_me))
        .with_state(fake.clone());
    let api_base = serve(router).await;

    let config = TelegramConfig {
        api_base,
        poll_timeout_s: 1,
        ..TelegramConfig::default()
    };
    let adapter = TelegramAdapter::new(reqwest::Client::new(), TOKEN.to_string(), &config);
    assert_eq!(
        adapter.identity().await.expect("getMe").as_deref(),
        Some("garys_bot")
    );

    let (_dir, state) = test_state();
    let bot = TrickBot::new(Arc::new(LocalTrickClient::new(state.tricks.clone())));

    let batch = adapter.poll_inbound().await.expect("first poll");
    assert_eq!(batch.len(), 2);
    for message in &batch {
        bot.dispatch(&adapter, message).await;
    }
    let batch = adapter.poll_inbound().await.expect("second poll");
    assert!(batch.is_empty());

    let polls = fake.polls.lock().clone();
    assert_eq!(polls[0]["offset"], json!(0));
    assert_eq!(polls[0]["timeout"], json!(1));
    assert_eq!(polls[1]["offset"], json!(502));

    let sent = fake.sent.lock().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["chat_id"], json!("42"));
    assert_eq!(sent[0]["reply_to_message_id"], json!(77));
    assert_eq!(sent[0]["text"], json!("Hier kommen Garys TagebuchEinträge"));
    assert_eq!(sent[1]["reply_to_message_id"], json!(80));
    assert_eq!(sent[1]["text"], json!("I don't know that command"));
}
