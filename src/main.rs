// 入口：加载配置、初始化存储，启动 tricks API 与 Telegram 机器人。
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use trick_tracker::channels::build_telegram_bot;
use trick_tracker::config::{load_config, Config};
use trick_tracker::shutdown::shutdown_signal;
use trick_tracker::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config();
    init_tracing(&config);
    let state = Arc::new(AppState::new(config.clone())?);

    if let Some((bot, adapter)) = build_telegram_bot(&state) {
        tokio::spawn(async move {
            bot.run(adapter).await;
        });
    }

    let app = trick_tracker::build_router(state.clone()).layer(TraceLayer::new_for_http());

    let addr = bind_address(&config);
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    info!("tricks API listening on http://{addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    if let Err(err) = server.await {
        warn!("服务退出异常: {err}");
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let default_level = config.observability.log_level.trim();
    let default_level = if default_level.is_empty() {
        "info".to_string()
    } else {
        default_level.to_lowercase()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn bind_address(config: &Config) -> String {
    // 保留环境变量覆盖，便于容器化部署。
    let host = std::env::var("TRICKS_HOST").unwrap_or_else(|_| config.server.host.clone());
    let port = std::env::var("TRICKS_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(config.server.port);
    format!("{host}:{port}")
}
