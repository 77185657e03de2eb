use crate::core::connector::Connector;
use crate::core::request::Request;
use crate::core::route::Route;
use crate::domain::model::{BoolResponseModel, Envelope, Notification, NotificationPayload};
use crate::domain::ports::HttpMethod;

/// 通知服務的 HTTP 入口，讓其他服務把通知排入佇列
#[derive(Debug, Clone)]
pub struct NotificationConnector {
    connector: Connector,
}

impl NotificationConnector {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub fn enqueue(&self, notification: &Notification) -> EnqueueNotification {
        EnqueueNotification {
            connector: self.connector.clone(),
            payload: NotificationPayload::from(notification),
        }
    }
}

pub struct EnqueueNotification {
    connector: Connector,
    payload: NotificationPayload,
}

impl Request for EnqueueNotification {
    type Response = BoolResponseModel;
    type Output = bool;

    fn connector(&self) -> &Connector {
        &self.connector
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn route(&self) -> Route {
        Route::new(["api", "notifications"])
    }

    fn body(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "receiverType": self.payload.receiver_type,
            "receiverData": self.payload.receiver_data,
            "message": self.payload.message,
        }))
    }

    fn into_output(response: BoolResponseModel) -> bool {
        response.into_result()
    }
}
