// 存储模块：封装 tricks 表的 SQLite 持久化读写。

mod sqlite;

use crate::config::StorageConfig;
use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

pub use sqlite::SqliteStorage;

/// A stored trick row. `id` is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrickRecord {
    pub id: i64,
    pub name: String,
    pub translated_name: String,
    pub description: String,
    pub difficulty: String,
    pub progress: String,
}

/// The five writable columns of a trick. Missing or `null` fields decode
/// as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrickFields {
    #[serde(deserialize_with = "deserialize_string_or_null")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_string_or_null")]
    pub translated_name: String,
    #[serde(deserialize_with = "deserialize_string_or_null")]
    pub description: String,
    #[serde(deserialize_with = "deserialize_string_or_null")]
    pub difficulty: String,
    #[serde(deserialize_with = "deserialize_string_or_null")]
    pub progress: String,
}

fn deserialize_string_or_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl TrickFields {
    pub fn into_record(self, id: i64) -> TrickRecord {
        TrickRecord {
            id,
            name: self.name,
            translated_name: self.translated_name,
            description: self.description,
            difficulty: self.difficulty,
            progress: self.progress,
        }
    }
}

impl From<TrickRecord> for TrickFields {
    fn from(record: TrickRecord) -> Self {
        Self {
            name: record.name,
            translated_name: record.translated_name,
            description: record.description,
            difficulty: record.difficulty,
            progress: record.progress,
        }
    }
}

/// 存储后端抽象，统一 tricks 表的读写入口。
pub trait StorageBackend: Send + Sync {
    fn ensure_initialized(&self) -> Result<()>;

    /// All rows in storage order.
    fn list_tricks(&self) -> Result<Vec<TrickRecord>>;

    /// Returns the id assigned to the new row.
    fn insert_trick(&self, fields: &TrickFields) -> Result<i64>;

    /// Overwrites every writable column of the row with `id`.
    /// A missing row is not an error; the affected count is 0.
    fn update_trick(&self, id: i64, fields: &TrickFields) -> Result<usize>;
}

pub fn build_storage(config: &StorageConfig) -> Result<Arc<dyn StorageBackend>> {
    Ok(Arc::new(SqliteStorage::new(config.db_path.trim().to_string())))
}
