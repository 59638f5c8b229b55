//! 端点客户端

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::app::users::model::{NewUser, User};
use crate::core::response::Envelope;

#[derive(Debug, Error)]
pub enum ClientError {
    /// 服务器返回 `ok:false`；没有错误文本时由调用方决定兜底提示
    #[error("{}", .0.as_deref().unwrap_or("request rejected by server"))]
    Rejected(Option<String>),
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// 面向用户的提示：优先使用服务器给出的错误文本
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ClientError::Rejected(Some(text)) if !text.is_empty() => text.clone(),
            ClientError::Rejected(_) => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

/// 用户目录端点的三个操作，成功时都返回完整集合
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, ClientError>;
    async fn create(&self, user: &NewUser) -> Result<Vec<User>, ClientError>;
    async fn delete(&self, index: i64) -> Result<Vec<User>, ClientError>;
}

/// 信封转结果
pub fn open_envelope(envelope: Envelope<Vec<User>>) -> Result<Vec<User>, ClientError> {
    if envelope.ok {
        Ok(envelope.data.unwrap_or_default())
    } else {
        Err(ClientError::Rejected(envelope.error))
    }
}

#[derive(Serialize)]
struct DeleteBody {
    index: i64,
}

/// 基于 reqwest 的实现
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpApiClient {
    /// `base_url` 形如 `http://127.0.0.1:3000`，`api_path` 形如 `/api`
    pub fn new(base_url: &str, api_path: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_path)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, api_path: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), api_path),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, action: &str) -> String {
        format!("{}?action={}", self.endpoint, action)
    }

    async fn read(response: reqwest::Response) -> Result<Vec<User>, ClientError> {
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, bytes = body.len(), "收到响应");
        let envelope: Envelope<Vec<User>> = serde_json::from_slice(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("{status}: {e}")))?;
        open_envelope(envelope)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn list(&self) -> Result<Vec<User>, ClientError> {
        let response = self.client.get(self.url("list")).send().await?;
        Self::read(response).await
    }

    async fn create(&self, user: &NewUser) -> Result<Vec<User>, ClientError> {
        let response = self
            .client
            .post(self.url("create"))
            .json(user)
            .send()
            .await?;
        Self::read(response).await
    }

    async fn delete(&self, index: i64) -> Result<Vec<User>, ClientError> {
        let response = self
            .client
            .post(self.url("delete"))
            .json(&DeleteBody { index })
            .send()
            .await?;
        Self::read(response).await
    }
}
