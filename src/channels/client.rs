// 机器人访问 tricks 的入口：默认进程内调用，可选走 HTTP 访问远端服务。
use crate::services::tricks::TrickService;
use crate::storage::{TrickFields, TrickRecord};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait TrickClient: Send + Sync {
    async fn list_tricks(&self) -> Result<Vec<TrickRecord>>;

    async fn create_trick(&self, fields: TrickFields) -> Result<TrickRecord>;
}

pub struct LocalTrickClient {
    service: TrickService,
}

impl LocalTrickClient {
    pub fn new(service: TrickService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TrickClient for LocalTrickClient {
    async fn list_tricks(&self) -> Result<Vec<TrickRecord>> {
        self.service.list().await
    }

    async fn create_trick(&self, fields: TrickFields) -> Result<TrickRecord> {
        self.service.create(fields).await
    }
}

pub struct HttpTrickClient {
    http: Client,
    base_url: String,
}

impl HttpTrickClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn tricks_url(&self) -> String {
        format!("{}/tricks", self.base_url)
    }
}

#[async_trait]
impl TrickClient for HttpTrickClient {
    async fn list_tricks(&self) -> Result<Vec<TrickRecord>> {
        let response = self.http.get(self.tricks_url()).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("trick list failed: {status} {body}"));
        }
        Ok(response.json().await?)
    }

    async fn create_trick(&self, fields: TrickFields) -> Result<TrickRecord> {
        let response = self
            .http
            .post(self.tricks_url())
            .json(&fields)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("trick create failed: {status} {body}"));
        }
        Ok(response.json().await?)
    }
}
