// 进程内 tricks 服务：HTTP 接口与聊天机器人共用同一入口。
use crate::storage::{StorageBackend, TrickFields, TrickRecord};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct TrickService {
    storage: Arc<dyn StorageBackend>,
}

impl TrickService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Result<Vec<TrickRecord>> {
        let storage = self.storage.clone();
        tokio::task::spawn_blocking(move || storage.list_tricks())
            .await
            .unwrap_or_else(|err| Err(anyhow!(err)))
    }

    pub async fn create(&self, fields: TrickFields) -> Result<TrickRecord> {
        let storage = self.storage.clone();
        let insert = fields.clone();
        let id = tokio::task::spawn_blocking(move || storage.insert_trick(&insert))
            .await
            .unwrap_or_else(|err| Err(anyhow!(err)))?;
        Ok(fields.into_record(id))
    }

    /// Echoes the given fields under `id` whether or not a row matched.
    pub async fn update(&self, id: i64, fields: TrickFields) -> Result<TrickRecord> {
        let storage = self.storage.clone();
        let update = fields.clone();
        let affected = tokio::task::spawn_blocking(move || storage.update_trick(id, &update))
            .await
            .unwrap_or_else(|err| Err(anyhow!(err)))?;
        if affected == 0 {
            debug!("trick update matched no row: id={id}");
        }
        Ok(fields.into_record(id))
    }
}
