use anyhow::Result;
use async_trait::async_trait;
use httpmock::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use travel_link::adapters::{
    HttpMailTransport, InMemoryQueue, ReqwestTransport, UserServiceDirectory,
};
use travel_link::domain::ports::{MailMessage, MailTransport, UserDirectory};
use travel_link::utils::validation::Validate;
use travel_link::{
    AppConfig, InterserviceCommunicator, NotificationSender, ProviderFactory, QueueListener,
    ServiceError,
};
use url::Url;

#[derive(Default)]
struct RecordingMail {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingMail {
    fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMail {
    async fn deliver(&self, message: &MailMessage) -> travel_link::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

struct NoUsers;

#[async_trait]
impl UserDirectory for NoUsers {
    async fn resolve_email(&self, user_id: &str) -> travel_link::Result<String> {
        Err(ServiceError::UserNotFound {
            user_id: user_id.to_string(),
        })
    }
}

fn listener_with(
    queue: &InMemoryQueue,
    mail: Arc<dyn MailTransport>,
    directory: Arc<dyn UserDirectory>,
) -> QueueListener {
    let factory = ProviderFactory::new(mail, directory, "Travel notification");
    QueueListener::new(Arc::new(queue.clone()), NotificationSender::new(factory))
        .with_max_delivery_attempts(3)
}

/// 端到端：email 類型的訊息以原樣的地址與內容投遞，並確認一次
#[tokio::test]
async fn test_email_message_end_to_end() -> Result<()> {
    let queue = InMemoryQueue::new();
    let id = queue.publish(r#"{"receiverType": 0, "receiverData": "user@example.com", "message": "hi"}"#)?;
    queue.close();

    let mail = Arc::new(RecordingMail::default());
    let (_shutdown, rx) = watch::channel(false);
    listener_with(&queue, mail.clone(), Arc::new(NoUsers)).run(rx).await?;

    let sent = mail.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "user@example.com");
    assert_eq!(sent[0].body, "hi");
    assert_eq!(queue.acknowledged(), vec![id]);
    Ok(())
}

/// 重送同一則訊息會產生兩次投遞，不會被略過
#[tokio::test]
async fn test_redelivered_message_is_delivered_again() -> Result<()> {
    let payload = r#"{"receiverType": 0, "receiverData": "user@example.com", "message": "hi"}"#;
    let queue = InMemoryQueue::new();
    let first = queue.publish(payload)?;
    let second = queue.publish(payload)?;
    queue.close();

    let mail = Arc::new(RecordingMail::default());
    let (_shutdown, rx) = watch::channel(false);
    listener_with(&queue, mail.clone(), Arc::new(NoUsers)).run(rx).await?;

    assert_eq!(mail.sent().len(), 2);
    assert_eq!(queue.acknowledged(), vec![first, second]);
    Ok(())
}

/// 無效地址重試也不會成功：不確認、不重送，第一次就進 dead-letter
#[tokio::test]
async fn test_invalid_address_is_dead_lettered_on_first_attempt() -> Result<()> {
    let queue = InMemoryQueue::new();
    queue.publish(r#"{"receiverType": 0, "receiverData": "not-an-address", "message": "hi"}"#)?;
    queue.close();

    let mail = Arc::new(RecordingMail::default());
    let (_shutdown, rx) = watch::channel(false);
    listener_with(&queue, mail.clone(), Arc::new(NoUsers)).run(rx).await?;

    assert!(mail.sent().is_empty());
    assert!(queue.acknowledged().is_empty());
    let dead = queue.dead_letters();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].delivery.attempt, 1);
    assert_eq!(queue.pending_len(), 0);
    Ok(())
}

/// 使用者 id 通道：經由使用者服務查詢 email，再透過郵件中繼送出
#[tokio::test]
async fn test_user_id_message_through_user_service_and_mail_relay() -> Result<()> {
    let server = MockServer::start_async().await;
    let user_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/users/u-7")
                .header("authorization", "Bearer svc-token");
            then.status(200).json_body(serde_json::json!({
                "id": "u-7",
                "username": "bob",
                "email": "bob@example.com"
            }));
        })
        .await;
    let relay_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/relay/send").json_body(serde_json::json!({
                "from": "no-reply@travel.example",
                "to": "bob@example.com",
                "subject": "Travel notification",
                "body": "Your booking is confirmed"
            }));
            then.status(202);
        })
        .await;

    let communicator = InterserviceCommunicator::initialize(
        HashMap::from([(
            travel_link::ServiceName::User,
            Url::parse(&server.base_url())?,
        )]),
        Arc::new(ReqwestTransport::new(Duration::from_secs(5))?),
        travel_link::ServiceCredential::Static("svc-token".to_string()),
    )
    .await?;

    let mail = Arc::new(HttpMailTransport::new(
        Url::parse(&server.url("/relay/send"))?,
        "no-reply@travel.example",
        Duration::from_secs(5),
    )?);
    let directory = Arc::new(UserServiceDirectory::new(communicator.users()?));

    let queue = InMemoryQueue::new();
    let id = queue.publish(
        r#"{"receiverType": 1, "receiverData": "u-7", "message": "Your booking is confirmed"}"#,
    )?;
    queue.close();

    let (_shutdown, rx) = watch::channel(false);
    listener_with(&queue, mail, directory).run(rx).await?;

    user_mock.assert_async().await;
    relay_mock.assert_async().await;
    assert_eq!(queue.acknowledged(), vec![id]);
    Ok(())
}

#[tokio::test]
async fn test_config_file_drives_service_wiring() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("travel-link.toml");
    tokio::fs::write(
        &config_path,
        r#"
[services]
user = "http://user:8080"
flight = "http://flight-search:8080/v2/"

[service_account]
token = "static-token"

[notification]
mail_relay_url = "http://mail-relay:8025/send"
sender_address = "no-reply@travel.example"
subject = "Booking update"

[logging]
json = true
"#,
    )
    .await?;

    let config = AppConfig::from_file(&config_path)?;
    config.validate()?;

    assert!(config.json_logs());
    assert_eq!(config.notification_subject(), "Booking update");
    assert_eq!(config.request_timeout(), Duration::from_secs(10));

    let communicator = InterserviceCommunicator::initialize(
        config.service_addresses()?,
        Arc::new(ReqwestTransport::new(config.request_timeout())?),
        config.service_credential()?,
    )
    .await?;

    let connector = communicator.connector(travel_link::ServiceName::Flight)?;
    assert_eq!(connector.bearer_token().as_deref(), Some("static-token"));
    assert_eq!(connector.base_address().as_str(), "http://flight-search:8080/v2/");
    assert!(communicator.auth().is_err());
    Ok(())
}
