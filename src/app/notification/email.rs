use crate::domain::model::Notification;
use crate::domain::ports::{MailMessage, MailTransport, NotificationProvider};
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::is_valid_email;
use async_trait::async_trait;
use std::sync::Arc;

/// `receiver_data` 即為收件 email
#[derive(Clone)]
pub struct EmailProvider {
    transport: Arc<dyn MailTransport>,
    subject: String,
}

impl EmailProvider {
    pub fn new(transport: Arc<dyn MailTransport>, subject: impl Into<String>) -> Self {
        Self {
            transport,
            subject: subject.into(),
        }
    }

    /// 先檢查地址語法，不合法時不會呼叫郵件傳輸
    pub async fn deliver_to(&self, address: &str, message: &str) -> Result<()> {
        if !is_valid_email(address) {
            return Err(ServiceError::InvalidAddress {
                address: address.to_string(),
            });
        }

        self.transport
            .deliver(&MailMessage {
                to: address.to_string(),
                subject: self.subject.clone(),
                body: message.to_string(),
            })
            .await
    }
}

#[async_trait]
impl NotificationProvider for EmailProvider {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        self.deliver_to(notification.receiver_data(), notification.message())
            .await
    }
}
