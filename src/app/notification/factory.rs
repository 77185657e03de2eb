use crate::app::notification::email::EmailProvider;
use crate::app::notification::user_id::UserIdProvider;
use crate::domain::model::ReceiverType;
use crate::domain::ports::{MailTransport, NotificationProvider, UserDirectory};
use crate::utils::error::Result;
use std::sync::Arc;

/// 依接收者類型挑選投遞通道；不支援的類型一律報錯，絕不退回預設通道
#[derive(Clone)]
pub struct ProviderFactory {
    email: Arc<dyn NotificationProvider>,
    user_id: Arc<dyn NotificationProvider>,
}

impl ProviderFactory {
    pub fn new(
        mail: Arc<dyn MailTransport>,
        directory: Arc<dyn UserDirectory>,
        subject: impl Into<String>,
    ) -> Self {
        let email = EmailProvider::new(mail, subject);
        let user_id = UserIdProvider::new(directory, email.clone());
        Self {
            email: Arc::new(email),
            user_id: Arc::new(user_id),
        }
    }

    pub fn create_by_receiver_type(
        &self,
        receiver_type: ReceiverType,
    ) -> Arc<dyn NotificationProvider> {
        match receiver_type {
            ReceiverType::Email => Arc::clone(&self.email),
            ReceiverType::UserId => Arc::clone(&self.user_id),
        }
    }

    /// 原始整數判別值（來自線上格式）
    pub fn create_by_discriminant(&self, value: i64) -> Result<Arc<dyn NotificationProvider>> {
        let receiver_type = ReceiverType::try_from(value)?;
        Ok(self.create_by_receiver_type(receiver_type))
    }
}
