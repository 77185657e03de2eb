use crate::domain::ports::{MailMessage, MailTransport};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// 透過 HTTP 郵件中繼送信
///
/// 以 JSON `{from, to, subject, body}` POST 到中繼位址，非 2xx 一律視為投遞失敗。
#[derive(Debug, Clone)]
pub struct HttpMailTransport {
    client: Client,
    relay_url: Url,
    from: String,
}

impl HttpMailTransport {
    pub fn new(relay_url: Url, from: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::ConfigError {
                message: format!("Failed to build mail relay client: {}", e),
            })?;
        Ok(Self {
            client,
            relay_url,
            from: from.into(),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn deliver(&self, message: &MailMessage) -> Result<()> {
        tracing::debug!("✉️ Relaying mail to {} via {}", message.to, self.relay_url);

        let response = self
            .client
            .post(self.relay_url.clone())
            .json(&serde_json::json!({
                "from": self.from,
                "to": message.to,
                "subject": message.subject,
                "body": message.body,
            }))
            .send()
            .await
            .map_err(|e| ServiceError::DeliveryFailed {
                recipient: message.to.clone(),
                reason: e.to_string(),
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::DeliveryFailed {
                recipient: message.to.clone(),
                reason: format!("mail relay responded with status {}", response.status()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn message() -> MailMessage {
        MailMessage {
            to: "user@example.com".to_string(),
            subject: "Travel notification".to_string(),
            body: "hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_deliver_posts_message_to_relay() {
        let server = MockServer::start_async().await;
        let relay_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/send").json_body(serde_json::json!({
                    "from": "no-reply@travel.example",
                    "to": "user@example.com",
                    "subject": "Travel notification",
                    "body": "hi",
                }));
                then.status(202);
            })
            .await;

        let transport = HttpMailTransport::new(
            Url::parse(&server.url("/send")).unwrap(),
            "no-reply@travel.example",
            Duration::from_secs(5),
        )
        .unwrap();

        transport.deliver(&message()).await.unwrap();
        relay_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_message_is_delivery_failed() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/send");
                then.status(550);
            })
            .await;

        let transport = HttpMailTransport::new(
            Url::parse(&server.url("/send")).unwrap(),
            "no-reply@travel.example",
            Duration::from_secs(5),
        )
        .unwrap();

        let err = transport.deliver(&message()).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::DeliveryFailed { recipient, .. } if recipient == "user@example.com"
        ));
    }
}
