use crate::utils::error::{Result, ServiceError};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is a valid regex")
    })
}

/// 檢查 email 地址的語法（不做 DNS / MX 查詢）
pub fn is_valid_email(address: &str) -> bool {
    address.len() <= 254 && email_regex().is_match(address)
}

pub fn validate_email(field_name: &str, address: &str) -> Result<()> {
    if is_valid_email(address) {
        Ok(())
    } else {
        Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: address.to_string(),
            reason: "Not a valid email address".to_string(),
        })
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ServiceError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ServiceError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("services.flight", "https://example.com").is_ok());
        assert!(validate_url("services.flight", "http://flight-search:8080").is_ok());
        assert!(validate_url("services.flight", "").is_err());
        assert!(validate_url("services.flight", "invalid-url").is_err());
        assert!(validate_url("services.flight", "ftp://example.com").is_err());
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("first.last+tag@mail.travel.io"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-address"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email(" user@example.com"));
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("http.timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("http.timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("token".to_string());
        let absent: Option<String> = None;
        assert_eq!(validate_required_field("token", &present).unwrap(), "token");
        assert!(matches!(
            validate_required_field("token", &absent),
            Err(ServiceError::MissingConfigError { .. })
        ));
    }
}
