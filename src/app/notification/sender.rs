use crate::app::notification::factory::ProviderFactory;
use crate::domain::model::Notification;
use crate::utils::error::Result;

/// Factory → Provider → send
#[derive(Clone)]
pub struct NotificationSender {
    factory: ProviderFactory,
}

impl NotificationSender {
    pub fn new(factory: ProviderFactory) -> Self {
        Self { factory }
    }

    pub async fn send(&self, notification: &Notification) -> Result<()> {
        let provider = self
            .factory
            .create_by_receiver_type(notification.receiver_type());
        tracing::debug!(
            "📨 Dispatching notification for '{}' via {} provider",
            notification.receiver_data(),
            provider.name()
        );
        provider.send(notification).await
    }
}
