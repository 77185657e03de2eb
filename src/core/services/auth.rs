use crate::core::connector::Connector;
use crate::core::request::Request;
use crate::core::route::Route;
use crate::domain::model::{BoolResponseModel, Envelope, StringResponseModel};
use crate::domain::ports::HttpMethod;

/// 驗證服務：服務帳號登入與密碼雜湊
#[derive(Debug, Clone)]
pub struct AuthConnector {
    connector: Connector,
}

impl AuthConnector {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub fn login(&self, username: &str, password: &str) -> Login {
        Login {
            connector: self.connector.clone(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn hash_password(&self, password: &str) -> HashPassword {
        HashPassword {
            connector: self.connector.clone(),
            password: password.to_string(),
        }
    }

    pub fn verify_password(&self, password: &str, digest: &str) -> VerifyPassword {
        VerifyPassword {
            connector: self.connector.clone(),
            password: password.to_string(),
            digest: digest.to_string(),
        }
    }
}

pub struct Login {
    connector: Connector,
    username: String,
    password: String,
}

impl Request for Login {
    type Response = StringResponseModel;
    type Output = String;

    fn connector(&self) -> &Connector {
        &self.connector
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn route(&self) -> Route {
        Route::new(["api", "auth", "login"])
    }

    fn body(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "username": self.username,
            "password": self.password,
        }))
    }

    fn into_output(response: StringResponseModel) -> String {
        response.into_result()
    }
}

pub struct HashPassword {
    connector: Connector,
    password: String,
}

impl Request for HashPassword {
    type Response = StringResponseModel;
    type Output = String;

    fn connector(&self) -> &Connector {
        &self.connector
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn route(&self) -> Route {
        Route::new(["api", "password", "hash"])
    }

    fn body(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({ "password": self.password }))
    }

    fn into_output(response: StringResponseModel) -> String {
        response.into_result()
    }
}

pub struct VerifyPassword {
    connector: Connector,
    password: String,
    digest: String,
}

impl Request for VerifyPassword {
    type Response = BoolResponseModel;
    type Output = bool;

    fn connector(&self) -> &Connector {
        &self.connector
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn route(&self) -> Route {
        Route::new(["api", "password", "verify"])
    }

    fn body(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "password": self.password,
            "hash": self.digest,
        }))
    }

    fn into_output(response: BoolResponseModel) -> bool {
        response.into_result()
    }
}
