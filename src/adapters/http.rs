use crate::domain::ports::{
    HttpMethod, TransportClient, TransportError, TransportRequest, TransportResponse,
};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;

/// 以 reqwest 實作的傳輸層，每個呼叫都套用固定逾時
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// 逾時與連線失敗分開回報，方便觀測
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[async_trait]
impl TransportClient for ReqwestTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url);

        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use url::Url;

    fn get(url: &str) -> TransportRequest {
        TransportRequest {
            method: HttpMethod::Get,
            url: Url::parse(url).unwrap(),
            bearer_token: None,
            body: None,
        }
    }

    #[tokio::test]
    async fn test_execute_returns_status_and_body() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/password/verify")
                    .header("authorization", "Bearer svc-token")
                    .json_body(serde_json::json!({"password": "p", "hash": "h"}));
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({"result": true}));
            })
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport
            .execute(TransportRequest {
                method: HttpMethod::Post,
                url: Url::parse(&server.url("/api/password/verify")).unwrap(),
                bearer_token: Some("svc-token".to_string()),
                body: Some(serde_json::json!({"password": "p", "hash": "h"})),
            })
            .await
            .unwrap();

        api_mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.body, r#"{"result":true}"#);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_a_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/flights/1");
                then.status(503);
            })
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport
            .execute(get(&server.url("/api/flights/1")))
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_secs(3));
            })
            .await;

        let transport = ReqwestTransport::new(Duration::from_millis(200)).unwrap();
        let err = transport.execute(get(&server.url("/slow"))).await.unwrap_err();

        assert_eq!(err, TransportError::Timeout);
    }

    #[tokio::test]
    async fn test_refused_connection_is_connection_error() {
        // 保留埠號後立即釋放，確保沒有服務在聽
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let err = transport
            .execute(get(&format!("http://127.0.0.1:{}/api", port)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Connection(_)));
    }
}
