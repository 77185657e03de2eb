use crate::core::connector::Connector;
use crate::core::route::{self, QueryParams, Route};
use crate::domain::ports::{HttpMethod, TransportRequest, TransportResponse};
use crate::utils::error::{FailureCause, Result, ServiceError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

/// 單一下游操作的呼叫描述
///
/// 每個操作實作成一個型別，建構時就綁定它的 [`Connector`]。
/// `send` 會消耗請求本身，因此一個請求只能送出一次。
///
/// 取消：丟棄 `send` 回傳的 future 會一併丟棄底層的 HTTP 呼叫並釋放連線。
/// 這一層不做重試，重試策略由呼叫端決定。
#[async_trait]
pub trait Request: Send + Sized {
    /// 回應本文要解碼成的線上模型（通常是某個回應封裝）
    type Response: DeserializeOwned + Send;
    type Output: Send;

    fn connector(&self) -> &Connector;

    fn method(&self) -> HttpMethod;

    fn route(&self) -> Route;

    fn query(&self) -> QueryParams {
        QueryParams::new()
    }

    fn body(&self) -> Option<serde_json::Value> {
        None
    }

    fn into_output(response: Self::Response) -> Self::Output;

    fn build_route(&self) -> Result<Url> {
        route::build_route(
            self.connector().base_address(),
            &self.route(),
            &self.query(),
        )
    }

    async fn send(self) -> Result<Self::Output> {
        let connector = self.connector().clone();
        let route = self.route().to_string();
        let transport_request = TransportRequest {
            method: self.method(),
            url: self.build_route()?,
            bearer_token: connector.bearer_token(),
            body: self.body(),
        };

        tracing::debug!(
            "📡 {} {} {}",
            connector.service(),
            transport_request.method,
            transport_request.url
        );

        let response = connector
            .transport()
            .execute(transport_request)
            .await
            .map_err(|e| {
                let cause = FailureCause::from(e);
                tracing::debug!("📡 {} {} failed: {}", connector.service(), route, cause);
                ServiceError::request_failed(connector.service().as_str(), route.clone(), cause)
            })?;

        tracing::debug!(
            "📡 {} {} responded with status {}",
            connector.service(),
            route,
            response.status
        );

        let decoded = interpret_response::<Self::Response>(
            connector.service().as_str(),
            &route,
            &response,
        )?;
        Ok(Self::into_output(decoded))
    }
}

/// 依狀態碼把原始回應對應成解碼後的模型或領域錯誤
pub fn interpret_response<T: DeserializeOwned>(
    service: &str,
    route: &str,
    response: &TransportResponse,
) -> Result<T> {
    if response.is_success() {
        return serde_json::from_str(&response.body).map_err(|e| {
            ServiceError::request_failed(service, route, FailureCause::Decode(e.to_string()))
        });
    }

    match response.status {
        401 | 403 => Err(ServiceError::AuthenticationFailed {
            service: service.to_string(),
            status: response.status,
        }),
        404 => Err(ServiceError::NotFound {
            service: service.to_string(),
            route: route.to_string(),
        }),
        status => Err(ServiceError::request_failed(
            service,
            route,
            FailureCause::Status(status),
        )),
    }
}
