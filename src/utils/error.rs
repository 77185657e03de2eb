use std::fmt;
use thiserror::Error;

/// 下游請求失敗的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// 超過傳輸層設定的逾時
    Timeout,
    /// 無法建立連線（拒絕連線、DNS 失敗等）
    Connection(String),
    /// 非預期的 HTTP 狀態碼
    Status(u16),
    /// 回應內容無法解碼成預期模型
    Decode(String),
    /// 其他傳輸層錯誤
    Transport(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Timeout => write!(f, "timed out"),
            FailureCause::Connection(detail) => write!(f, "connection failed: {}", detail),
            FailureCause::Status(code) => write!(f, "unexpected status {}", code),
            FailureCause::Decode(detail) => write!(f, "malformed response body: {}", detail),
            FailureCause::Transport(detail) => write!(f, "transport error: {}", detail),
        }
    }
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Resource not found: {service} {route}")]
    NotFound { service: String, route: String },

    #[error("Authentication rejected by {service} (status {status})")]
    AuthenticationFailed { service: String, status: u16 },

    #[error("Request to {service} {route} failed: {cause}")]
    RequestFailed {
        service: String,
        route: String,
        cause: FailureCause,
    },

    #[error("Unsupported receiver type: {value}")]
    UnsupportedReceiverType { value: i64 },

    #[error("Invalid email address: '{address}'")]
    InvalidAddress { address: String },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: String },

    #[error("Delivery to {recipient} failed: {reason}")]
    DeliveryFailed { recipient: String, reason: String },

    #[error("Flight {id} does not exist")]
    FlightDoesNotExist { id: i64 },

    #[error("Malformed queue message: {message}")]
    MessageDeserialization { message: String },

    #[error("Queue operation '{operation}' failed: {message}")]
    QueueError { operation: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Downstream,
    Delivery,
    Message,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ServiceError {
    pub fn request_failed(
        service: impl Into<String>,
        route: impl Into<String>,
        cause: FailureCause,
    ) -> Self {
        ServiceError::RequestFailed {
            service: service.into(),
            route: route.into(),
            cause,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::NotFound { .. }
            | ServiceError::AuthenticationFailed { .. }
            | ServiceError::RequestFailed { .. }
            | ServiceError::FlightDoesNotExist { .. } => ErrorCategory::Downstream,
            ServiceError::InvalidAddress { .. }
            | ServiceError::UserNotFound { .. }
            | ServiceError::DeliveryFailed { .. } => ErrorCategory::Delivery,
            ServiceError::UnsupportedReceiverType { .. }
            | ServiceError::MessageDeserialization { .. }
            | ServiceError::SerializationError(_) => ErrorCategory::Message,
            ServiceError::ConfigError { .. }
            | ServiceError::InvalidConfigValueError { .. }
            | ServiceError::MissingConfigError { .. }
            | ServiceError::UrlError(_) => ErrorCategory::Configuration,
            ServiceError::QueueError { .. } | ServiceError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ServiceError::NotFound { .. }
            | ServiceError::FlightDoesNotExist { .. }
            | ServiceError::UserNotFound { .. } => ErrorSeverity::Low,
            ServiceError::RequestFailed { .. } | ServiceError::DeliveryFailed { .. } => {
                ErrorSeverity::Medium
            }
            ServiceError::AuthenticationFailed { .. }
            | ServiceError::InvalidAddress { .. }
            | ServiceError::UnsupportedReceiverType { .. }
            | ServiceError::MessageDeserialization { .. }
            | ServiceError::SerializationError(_) => ErrorSeverity::High,
            ServiceError::ConfigError { .. }
            | ServiceError::InvalidConfigValueError { .. }
            | ServiceError::MissingConfigError { .. }
            | ServiceError::UrlError(_)
            | ServiceError::QueueError { .. }
            | ServiceError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 是否值得由呼叫端重試（傳輸層錯誤與投遞失敗）
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::RequestFailed { cause, .. } => !matches!(cause, FailureCause::Decode(_)),
            ServiceError::DeliveryFailed { .. } => true,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ServiceError::RequestFailed {
                cause: FailureCause::Timeout,
                ..
            }
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ServiceError::NotFound { .. } | ServiceError::FlightDoesNotExist { .. } => {
                "Check that the identifier exists in the downstream service".to_string()
            }
            ServiceError::AuthenticationFailed { .. } => {
                "Check the service account credentials or refresh the token".to_string()
            }
            ServiceError::RequestFailed { cause, .. } => match cause {
                FailureCause::Timeout => {
                    "Increase http.timeout_seconds or check downstream latency".to_string()
                }
                FailureCause::Connection(_) => {
                    "Verify the service base URL and that the service is running".to_string()
                }
                FailureCause::Decode(_) => {
                    "Downstream response shape changed; check service versions".to_string()
                }
                _ => "Retry later; inspect downstream service logs".to_string(),
            },
            ServiceError::UnsupportedReceiverType { .. } => {
                "Use receiverType 0 (email) or 1 (user id)".to_string()
            }
            ServiceError::InvalidAddress { .. } => {
                "Correct the receiver email address".to_string()
            }
            ServiceError::UserNotFound { .. } => {
                "Verify the user id is registered in the user service".to_string()
            }
            ServiceError::DeliveryFailed { .. } => {
                "Check the mail relay; the message will be redelivered".to_string()
            }
            ServiceError::MessageDeserialization { .. } => {
                "Inspect the dead-letter queue for the malformed payload".to_string()
            }
            ServiceError::QueueError { .. } => "Check the queue connection".to_string(),
            ServiceError::ConfigError { .. }
            | ServiceError::InvalidConfigValueError { .. }
            | ServiceError::MissingConfigError { .. }
            | ServiceError::UrlError(_) => "Fix the configuration file and restart".to_string(),
            ServiceError::IoError(_) => "Check file paths and permissions".to_string(),
            ServiceError::SerializationError(_) => "Check the JSON payload format".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ServiceError::NotFound { .. } => "The requested resource does not exist".to_string(),
            ServiceError::FlightDoesNotExist { id } => format!("Flight {} does not exist", id),
            ServiceError::AuthenticationFailed { service, .. } => {
                format!("Could not authenticate against the {} service", service)
            }
            ServiceError::RequestFailed { service, cause, .. } => {
                format!("The {} service could not be reached ({})", service, cause)
            }
            ServiceError::InvalidAddress { address } => {
                format!("'{}' is not a valid email address", address)
            }
            ServiceError::UserNotFound { user_id } => format!("Unknown user '{}'", user_id),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
