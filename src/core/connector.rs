use crate::domain::ports::TransportClient;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use url::Url;

/// 平台上的下游服務
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    Auth,
    Flight,
    User,
    Notification,
}

impl ServiceName {
    pub const ALL: [ServiceName; 4] = [
        ServiceName::Auth,
        ServiceName::Flight,
        ServiceName::User,
        ServiceName::Notification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::Auth => "auth",
            ServiceName::Flight => "flight",
            ServiceName::User => "user",
            ServiceName::Notification => "notification",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 服務間呼叫使用的 bearer token（唯讀端）
pub type CredentialReceiver = watch::Receiver<Option<String>>;

/// 某個下游服務的連接器
///
/// 只持有固定的基底位址、傳輸層與憑證的唯讀端，clone 成本低，
/// 可同時被任意多個請求共用。
#[derive(Clone)]
pub struct Connector {
    service: ServiceName,
    base_address: Url,
    transport: Arc<dyn TransportClient>,
    credential: CredentialReceiver,
}

impl Connector {
    pub fn new(
        service: ServiceName,
        base_address: Url,
        transport: Arc<dyn TransportClient>,
        credential: CredentialReceiver,
    ) -> Self {
        Self {
            service,
            base_address,
            transport,
            credential,
        }
    }

    pub fn service(&self) -> ServiceName {
        self.service
    }

    pub fn base_address(&self) -> &Url {
        &self.base_address
    }

    pub fn transport(&self) -> &Arc<dyn TransportClient> {
        &self.transport
    }

    /// 目前的憑證快照；更新是整個值替換，不會讀到一半
    pub fn bearer_token(&self) -> Option<String> {
        self.credential.borrow().clone()
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("service", &self.service)
            .field("base_address", &self.base_address.as_str())
            .field("authenticated", &self.credential.borrow().is_some())
            .finish()
    }
}
