use crate::core::request::Request;
use crate::core::services::AuthConnector;
use crate::domain::ports::PasswordHasher;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 密碼雜湊交給驗證服務處理，本地不實作任何演算法
#[derive(Debug, Clone)]
pub struct AuthServicePasswordHasher {
    auth: AuthConnector,
}

impl AuthServicePasswordHasher {
    pub fn new(auth: AuthConnector) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl PasswordHasher for AuthServicePasswordHasher {
    async fn hash(&self, password: &str) -> Result<String> {
        self.auth.hash_password(password).send().await
    }

    async fn verify(&self, password: &str, digest: &str) -> Result<bool> {
        self.auth.verify_password(password, digest).send().await
    }
}
