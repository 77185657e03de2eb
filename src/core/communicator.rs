use crate::core::connector::{Connector, ServiceName};
use crate::core::request::Request;
use crate::core::services::{AuthConnector, FlightConnector, NotificationConnector, UserConnector};
use crate::domain::ports::TransportClient;
use crate::utils::error::{Result, ServiceError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

/// 服務間呼叫的憑證來源
#[derive(Debug, Clone)]
pub enum ServiceCredential {
    /// 不帶 Authorization 標頭
    Anonymous,
    /// 由外部提供的固定 token
    Static(String),
    /// 啟動時以服務帳號向驗證服務登入取得 token
    ServiceAccount { username: String, password: String },
}

/// 全程序共用的服務間通訊入口
///
/// 只能透過 [`InterserviceCommunicator::initialize`] 建立；該函式在取得初始憑證後
/// 才回傳，所以拿到實例就代表已可發送請求。以參考傳給所有使用者，不是全域單例。
pub struct InterserviceCommunicator {
    addresses: HashMap<ServiceName, Url>,
    transport: Arc<dyn TransportClient>,
    credential_source: ServiceCredential,
    credential: watch::Sender<Option<String>>,
}

impl InterserviceCommunicator {
    pub async fn initialize(
        addresses: HashMap<ServiceName, Url>,
        transport: Arc<dyn TransportClient>,
        credential_source: ServiceCredential,
    ) -> Result<Self> {
        let (credential, _) = watch::channel(None);
        let communicator = Self {
            addresses,
            transport,
            credential_source,
            credential,
        };

        communicator.refresh_credential().await?;

        tracing::info!(
            "🔗 Interservice communicator ready ({} services, authenticated: {})",
            communicator.addresses.len(),
            communicator.credential.borrow().is_some()
        );
        Ok(communicator)
    }

    /// 重新取得憑證並整個替換；並行中的請求只會看到舊值或新值
    pub async fn refresh_credential(&self) -> Result<()> {
        let token = match &self.credential_source {
            ServiceCredential::Anonymous => None,
            ServiceCredential::Static(token) => Some(token.clone()),
            ServiceCredential::ServiceAccount { username, password } => {
                tracing::debug!("🔑 Logging in service account '{}'", username);
                let (_, anonymous) = watch::channel(None);
                let auth = AuthConnector::new(Connector::new(
                    ServiceName::Auth,
                    self.address(ServiceName::Auth)?.clone(),
                    Arc::clone(&self.transport),
                    anonymous,
                ));
                Some(auth.login(username, password).send().await?)
            }
        };

        self.credential.send_replace(token);
        Ok(())
    }

    /// 以外部取得的 token 取代目前憑證
    pub fn replace_credential(&self, token: Option<String>) {
        self.credential.send_replace(token);
    }

    pub fn connector(&self, service: ServiceName) -> Result<Connector> {
        Ok(Connector::new(
            service,
            self.address(service)?.clone(),
            Arc::clone(&self.transport),
            self.credential.subscribe(),
        ))
    }

    pub fn auth(&self) -> Result<AuthConnector> {
        self.connector(ServiceName::Auth).map(AuthConnector::new)
    }

    pub fn flights(&self) -> Result<FlightConnector> {
        self.connector(ServiceName::Flight).map(FlightConnector::new)
    }

    pub fn users(&self) -> Result<UserConnector> {
        self.connector(ServiceName::User).map(UserConnector::new)
    }

    pub fn notifications(&self) -> Result<NotificationConnector> {
        self.connector(ServiceName::Notification)
            .map(NotificationConnector::new)
    }

    fn address(&self, service: ServiceName) -> Result<&Url> {
        self.addresses
            .get(&service)
            .ok_or_else(|| ServiceError::MissingConfigError {
                field: format!("services.{}", service),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{TransportError, TransportRequest, TransportResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 記錄每個請求，並依序回傳預先準備的回應
    struct ScriptedTransport {
        responses: Mutex<Vec<TransportResponse>>,
        seen: Mutex<Vec<TransportRequest>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<(u16, &str)>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .rev()
                        .map(|(status, body)| TransportResponse {
                            status,
                            body: body.to_string(),
                        })
                        .collect(),
                ),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<TransportRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TransportClient for ScriptedTransport {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> std::result::Result<TransportResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| TransportError::Connection("no scripted response".to_string()))
        }
    }

    fn addresses() -> HashMap<ServiceName, Url> {
        HashMap::from([
            (ServiceName::Auth, Url::parse("http://auth:8080").unwrap()),
            (ServiceName::Flight, Url::parse("http://flight:8080").unwrap()),
        ])
    }

    #[tokio::test]
    async fn test_service_account_login_happens_before_ready() {
        let transport = ScriptedTransport::new(vec![
            (200, r#"{"result":"token-1"}"#),
            (200, r#"{"result":true}"#),
        ]);
        let communicator = InterserviceCommunicator::initialize(
            addresses(),
            transport.clone(),
            ServiceCredential::ServiceAccount {
                username: "notifier".to_string(),
                password: "secret".to_string(),
            },
        )
        .await
        .unwrap();

        let exists = communicator
            .flights()
            .unwrap()
            .flight_exists(7)
            .send()
            .await
            .unwrap();
        assert!(exists);

        let seen = transport.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].url.as_str(), "http://auth:8080/api/auth/login");
        assert_eq!(seen[0].bearer_token, None);
        assert_eq!(seen[1].bearer_token.as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn test_failed_login_fails_initialization() {
        let transport = ScriptedTransport::new(vec![(401, "")]);
        let result = InterserviceCommunicator::initialize(
            addresses(),
            transport,
            ServiceCredential::ServiceAccount {
                username: "notifier".to_string(),
                password: "wrong".to_string(),
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(ServiceError::AuthenticationFailed { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_service_is_config_error() {
        let communicator = InterserviceCommunicator::initialize(
            addresses(),
            ScriptedTransport::new(vec![]),
            ServiceCredential::Anonymous,
        )
        .await
        .unwrap();

        let err = communicator.users().unwrap_err();
        assert!(matches!(err, ServiceError::MissingConfigError { field } if field == "services.user"));
    }

    #[tokio::test]
    async fn test_refresh_is_visible_to_existing_connectors() {
        let transport = ScriptedTransport::new(vec![
            (200, r#"{"result":"token-1"}"#),
            (200, r#"{"result":"token-2"}"#),
        ]);
        let communicator = InterserviceCommunicator::initialize(
            addresses(),
            transport,
            ServiceCredential::ServiceAccount {
                username: "notifier".to_string(),
                password: "secret".to_string(),
            },
        )
        .await
        .unwrap();

        let connector = communicator.connector(ServiceName::Flight).unwrap();
        assert_eq!(connector.bearer_token().as_deref(), Some("token-1"));

        communicator.refresh_credential().await.unwrap();
        assert_eq!(connector.bearer_token().as_deref(), Some("token-2"));

        communicator.replace_credential(None);
        assert_eq!(connector.bearer_token(), None);
    }
}
