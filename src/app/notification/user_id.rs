use crate::app::notification::email::EmailProvider;
use crate::domain::model::Notification;
use crate::domain::ports::{NotificationProvider, UserDirectory};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// `receiver_data` 是使用者 id，先查出 email 再走 email 投遞流程
#[derive(Clone)]
pub struct UserIdProvider {
    directory: Arc<dyn UserDirectory>,
    email: EmailProvider,
}

impl UserIdProvider {
    pub fn new(directory: Arc<dyn UserDirectory>, email: EmailProvider) -> Self {
        Self { directory, email }
    }
}

#[async_trait]
impl NotificationProvider for UserIdProvider {
    fn name(&self) -> &'static str {
        "user_id"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        let address = self
            .directory
            .resolve_email(notification.receiver_data())
            .await?;
        tracing::debug!(
            "👤 Resolved user {} to {}",
            notification.receiver_data(),
            address
        );
        self.email.deliver_to(&address, notification.message()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ReceiverType;
    use crate::domain::ports::{MailMessage, MailTransport};
    use crate::utils::error::ServiceError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FixedDirectory(HashMap<String, String>);

    #[async_trait]
    impl UserDirectory for FixedDirectory {
        async fn resolve_email(&self, user_id: &str) -> Result<String> {
            self.0
                .get(user_id)
                .cloned()
                .ok_or_else(|| ServiceError::UserNotFound {
                    user_id: user_id.to_string(),
                })
        }
    }

    #[derive(Default)]
    struct RecordingMail(Mutex<Vec<MailMessage>>);

    #[async_trait]
    impl MailTransport for RecordingMail {
        async fn deliver(&self, message: &MailMessage) -> Result<()> {
            self.0.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn provider(mail: Arc<RecordingMail>) -> UserIdProvider {
        let directory = FixedDirectory(HashMap::from([
            ("u-1".to_string(), "alice@example.com".to_string()),
            ("u-2".to_string(), "broken-address".to_string()),
        ]));
        UserIdProvider::new(Arc::new(directory), EmailProvider::new(mail, "Trip"))
    }

    #[tokio::test]
    async fn test_resolves_user_then_sends_email() {
        let mail = Arc::new(RecordingMail::default());
        provider(mail.clone())
            .send(&Notification::new(ReceiverType::UserId, "u-1", "Gate changed"))
            .await
            .unwrap();

        let sent = mail.0.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert_eq!(sent[0].body, "Gate changed");
    }

    #[tokio::test]
    async fn test_unknown_user_is_user_not_found() {
        let mail = Arc::new(RecordingMail::default());
        let err = provider(mail.clone())
            .send(&Notification::new(ReceiverType::UserId, "u-404", "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::UserNotFound { user_id } if user_id == "u-404"));
        assert!(mail.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolved_address_is_still_validated() {
        let mail = Arc::new(RecordingMail::default());
        let err = provider(mail.clone())
            .send(&Notification::new(ReceiverType::UserId, "u-2", "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidAddress { .. }));
        assert!(mail.0.lock().unwrap().is_empty());
    }
}
