use crate::app::notification::RetryBackoff;
use crate::core::{ServiceCredential, ServiceName};
use crate::utils::error::{Result, ServiceError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_SUBJECT: &str = "Travel notification";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub services: ServicesConfig,
    pub http: Option<HttpConfig>,
    pub service_account: Option<ServiceAccountConfig>,
    pub notification: NotificationConfig,
    pub logging: Option<LoggingConfig>,
}

/// 各下游服務的基底位址
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub auth: Option<String>,
    pub flight: Option<String>,
    pub user: Option<String>,
    pub notification: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
}

/// 固定 token，或以帳密登入驗證服務（兩者擇一）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountConfig {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub mail_relay_url: String,
    pub sender_address: String,
    pub subject: Option<String>,
    pub max_delivery_attempts: Option<u32>,
    /// 第一次重送前的等待時間，之後每次加倍
    pub retry_base_delay_ms: Option<u64>,
    pub retry_max_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: Option<bool>,
    pub verbose: Option<bool>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"))
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ServiceError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NOTIFIER_PASSWORD})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn request_timeout(&self) -> Duration {
        let seconds = self
            .http
            .as_ref()
            .and_then(|h| h.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        Duration::from_secs(seconds)
    }

    pub fn notification_subject(&self) -> &str {
        self.notification
            .subject
            .as_deref()
            .unwrap_or(DEFAULT_SUBJECT)
    }

    /// 任一退避欄位有設定時才覆寫預設；未設定的欄位沿用預設值
    pub fn retry_backoff(&self) -> Option<RetryBackoff> {
        let notification = &self.notification;
        if notification.retry_base_delay_ms.is_none()
            && notification.retry_max_delay_ms.is_none()
        {
            return None;
        }

        let default = RetryBackoff::default();
        let base = notification
            .retry_base_delay_ms
            .map_or(default.base(), Duration::from_millis);
        let max = notification
            .retry_max_delay_ms
            .map_or(default.max(), Duration::from_millis);
        Some(RetryBackoff::new(base, max))
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.json)
            .unwrap_or(false)
    }

    pub fn verbose_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    /// 已設定的服務與其基底位址
    pub fn service_addresses(&self) -> Result<HashMap<ServiceName, Url>> {
        let mut addresses = HashMap::new();
        for service in ServiceName::ALL {
            if let Some(raw) = self.services.address_of(service) {
                addresses.insert(service, Url::parse(raw)?);
            }
        }
        Ok(addresses)
    }

    pub fn service_credential(&self) -> Result<ServiceCredential> {
        let Some(account) = &self.service_account else {
            return Ok(ServiceCredential::Anonymous);
        };

        match (&account.token, &account.username, &account.password) {
            (Some(token), None, None) => Ok(ServiceCredential::Static(token.clone())),
            (None, Some(username), Some(password)) => Ok(ServiceCredential::ServiceAccount {
                username: username.clone(),
                password: password.clone(),
            }),
            (None, None, None) => Ok(ServiceCredential::Anonymous),
            (None, Some(_), None) => Err(ServiceError::MissingConfigError {
                field: "service_account.password".to_string(),
            }),
            (None, None, Some(_)) => Err(ServiceError::MissingConfigError {
                field: "service_account.username".to_string(),
            }),
            (Some(_), _, _) => Err(ServiceError::ConfigError {
                message: "service_account: set either token or username/password, not both"
                    .to_string(),
            }),
        }
    }

    pub fn mail_relay_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.notification.mail_relay_url)?)
    }
}

impl ServicesConfig {
    pub fn address_of(&self, service: ServiceName) -> Option<&str> {
        match service {
            ServiceName::Auth => self.auth.as_deref(),
            ServiceName::Flight => self.flight.as_deref(),
            ServiceName::User => self.user.as_deref(),
            ServiceName::Notification => self.notification.as_deref(),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        for service in ServiceName::ALL {
            if let Some(address) = self.services.address_of(service) {
                validation::validate_url(&format!("services.{}", service), address)?;
            }
        }

        // 使用者 id 通道需要查詢使用者服務
        validation::validate_required_field("services.user", &self.services.user)?;

        if let Some(timeout) = self.http.as_ref().and_then(|h| h.timeout_seconds) {
            validation::validate_positive_number("http.timeout_seconds", timeout, 1)?;
        }

        let credential = self.service_credential()?;
        if matches!(credential, ServiceCredential::ServiceAccount { .. }) {
            validation::validate_required_field("services.auth", &self.services.auth)?;
        }
        if let ServiceCredential::Static(token) = &credential {
            validation::validate_non_empty_string("service_account.token", token)?;
        }

        validation::validate_url("notification.mail_relay_url", &self.notification.mail_relay_url)?;
        validation::validate_email(
            "notification.sender_address",
            &self.notification.sender_address,
        )?;
        if let Some(max) = self.notification.max_delivery_attempts {
            validation::validate_positive_number(
                "notification.max_delivery_attempts",
                u64::from(max),
                1,
            )?;
        }
        if let (Some(base), Some(max)) = (
            self.notification.retry_base_delay_ms,
            self.notification.retry_max_delay_ms,
        ) {
            validation::validate_positive_number("notification.retry_max_delay_ms", max, base)?;
        }

        Ok(())
    }
}
