// 全局应用状态：集中初始化存储与服务并管理依赖注入。

use crate::config::Config;
use crate::services::tricks::TrickService;
use crate::storage::{build_storage, StorageBackend};
use anyhow::{Context, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tricks: TrickService,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let storage = init_storage(&config)?;
        Ok(Self {
            config,
            tricks: TrickService::new(storage),
        })
    }
}

fn init_storage(config: &Config) -> Result<Arc<dyn StorageBackend>> {
    let storage = build_storage(&config.storage)?;
    storage
        .ensure_initialized()
        .context("Failed to initialize trick storage")?;
    Ok(storage)
}
