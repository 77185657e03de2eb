use crate::core::connector::Connector;
use crate::core::request::Request;
use crate::core::route::Route;
use crate::domain::model::{BoolResponseModel, Envelope, UserInfo};
use crate::domain::ports::HttpMethod;

#[derive(Debug, Clone)]
pub struct UserConnector {
    connector: Connector,
}

impl UserConnector {
    pub fn new(connector: Connector) -> Self {
        Self { connector }
    }

    pub fn get_user(&self, id: &str) -> GetUser {
        GetUser {
            connector: self.connector.clone(),
            id: id.to_string(),
        }
    }

    pub fn user_exists(&self, id: &str) -> UserExists {
        UserExists {
            connector: self.connector.clone(),
            id: id.to_string(),
        }
    }
}

pub struct GetUser {
    connector: Connector,
    id: String,
}

impl Request for GetUser {
    type Response = UserInfo;
    type Output = UserInfo;

    fn connector(&self) -> &Connector {
        &self.connector
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn route(&self) -> Route {
        Route::new(["api", "users", self.id.as_str()])
    }

    fn into_output(response: UserInfo) -> UserInfo {
        response
    }
}

pub struct UserExists {
    connector: Connector,
    id: String,
}

impl Request for UserExists {
    type Response = BoolResponseModel;
    type Output = bool;

    fn connector(&self) -> &Connector {
        &self.connector
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn route(&self) -> Route {
        Route::new(["api", "users", self.id.as_str(), "exists"])
    }

    fn into_output(response: BoolResponseModel) -> bool {
        response.into_result()
    }
}
