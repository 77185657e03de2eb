use crate::core::request::Request;
use crate::core::services::UserConnector;
use crate::domain::ports::UserDirectory;
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;

/// 以使用者服務查詢聯絡 email
#[derive(Debug, Clone)]
pub struct UserServiceDirectory {
    users: UserConnector,
}

impl UserServiceDirectory {
    pub fn new(users: UserConnector) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for UserServiceDirectory {
    async fn resolve_email(&self, user_id: &str) -> Result<String> {
        match self.users.get_user(user_id).send().await {
            Ok(user) => Ok(user.email),
            Err(ServiceError::NotFound { .. }) => Err(ServiceError::UserNotFound {
                user_id: user_id.to_string(),
            }),
            Err(other) => Err(other),
        }
    }
}
