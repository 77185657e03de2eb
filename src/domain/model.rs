use crate::utils::error::{Result, ServiceError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---- 回應封裝（所有下游服務的標準回應格式） ----

/// 回應封裝：把 `{ "result": ... }` 解開成領域值
pub trait Envelope {
    type Value;

    fn into_result(self) -> Self::Value;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolResponseModel {
    pub result: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringResponseModel {
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumerableResponseModel<T> {
    pub result: Vec<T>,
}

impl Envelope for BoolResponseModel {
    type Value = bool;

    fn into_result(self) -> bool {
        self.result
    }
}

impl Envelope for StringResponseModel {
    type Value = String;

    fn into_result(self) -> String {
        self.result
    }
}

impl<T> Envelope for EnumerableResponseModel<T> {
    type Value = Vec<T>;

    fn into_result(self) -> Vec<T> {
        self.result
    }
}

// ---- 下游服務的領域模型 ----

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledFlight {
    pub id: i64,
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub available_seats: u32,
    pub price: f64,
}

/// 航班搜尋條件；未設定的欄位不會出現在查詢字串中
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightFilter {
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
    pub departure_date: Option<chrono::NaiveDate>,
    pub min_available_seats: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
}

// ---- 通知 ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ReceiverType {
    Email,
    UserId,
}

impl TryFrom<i64> for ReceiverType {
    type Error = ServiceError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(ReceiverType::Email),
            1 => Ok(ReceiverType::UserId),
            other => Err(ServiceError::UnsupportedReceiverType { value: other }),
        }
    }
}

impl From<ReceiverType> for i64 {
    fn from(value: ReceiverType) -> Self {
        match value {
            ReceiverType::Email => 0,
            ReceiverType::UserId => 1,
        }
    }
}

/// 一則待投遞的通知，建立後不可變
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    receiver_type: ReceiverType,
    receiver_data: String,
    message: String,
}

impl Notification {
    pub fn new(
        receiver_type: ReceiverType,
        receiver_data: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            receiver_type,
            receiver_data: receiver_data.into(),
            message: message.into(),
        }
    }

    pub fn receiver_type(&self) -> ReceiverType {
        self.receiver_type
    }

    pub fn receiver_data(&self) -> &str {
        &self.receiver_data
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// 佇列訊息的線上格式
///
/// `receiverType` 保留原始整數，未知值在轉換成 [`Notification`] 時才被拒絕，
/// 好讓監聽器能分辨「JSON 壞掉」與「接收者類型不支援」。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub receiver_type: i64,
    pub receiver_data: String,
    pub message: String,
}

impl NotificationPayload {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| ServiceError::MessageDeserialization {
            message: e.to_string(),
        })
    }
}

impl TryFrom<NotificationPayload> for Notification {
    type Error = ServiceError;

    fn try_from(payload: NotificationPayload) -> Result<Self> {
        let receiver_type = ReceiverType::try_from(payload.receiver_type)?;
        Ok(Notification::new(
            receiver_type,
            payload.receiver_data,
            payload.message,
        ))
    }
}

impl From<&Notification> for NotificationPayload {
    fn from(notification: &Notification) -> Self {
        Self {
            receiver_type: notification.receiver_type.into(),
            receiver_data: notification.receiver_data.clone(),
            message: notification.message.clone(),
        }
    }
}

/// 從佇列取出的一筆訊息
#[derive(Debug, Clone)]
pub struct Delivery {
    pub id: u64,
    pub payload: Vec<u8>,
    /// 第幾次投遞（首次為 1）
    pub attempt: u32,
    pub received_at: DateTime<Utc>,
}
