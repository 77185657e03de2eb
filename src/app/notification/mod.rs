//! 通知派送：佇列監聽 → provider 工廠 → 投遞 provider

pub mod email;
pub mod factory;
pub mod listener;
pub mod sender;
pub mod user_id;

pub use email::EmailProvider;
pub use factory::ProviderFactory;
pub use listener::{
    ListenerState, ProcessOutcome, QueueListener, RetryBackoff, ShutdownSignal,
    DEFAULT_MAX_DELIVERY_ATTEMPTS,
};
pub use sender::NotificationSender;
pub use user_id::UserIdProvider;
