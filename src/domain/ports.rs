use crate::domain::model::{Delivery, Notification};
use crate::utils::error::{FailureCause, Result};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub bearer_token: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for FailureCause {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => FailureCause::Timeout,
            TransportError::Connection(detail) => FailureCause::Connection(detail),
            TransportError::Other(detail) => FailureCause::Transport(detail),
        }
    }
}

/// 執行單一 HTTP 呼叫；實作必須自行套用逾時
#[async_trait]
pub trait TransportClient: Send + Sync {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: &MailMessage) -> Result<()>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 解析使用者 id 的聯絡 email；找不到時回傳 `UserNotFound`
    async fn resolve_email(&self, user_id: &str) -> Result<String>;
}

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String>;
    async fn verify(&self, password: &str, digest: &str) -> Result<bool>;
}

/// 至少一次（at-least-once）語意的訊息佇列
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// 等待下一筆訊息；佇列關閉時回傳 `None`
    async fn receive(&self) -> Result<Option<Delivery>>;
    async fn ack(&self, delivery: &Delivery) -> Result<()>;
    /// 不確認並放回佇列，稍後重新投遞
    async fn requeue(&self, delivery: &Delivery) -> Result<()>;
    async fn dead_letter(&self, delivery: &Delivery, reason: &str) -> Result<()>;
}

#[async_trait]
pub trait NotificationProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, notification: &Notification) -> Result<()>;
}
