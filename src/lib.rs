pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::AppConfig;

pub use app::notification::{NotificationSender, ProviderFactory, QueueListener};
pub use core::{InterserviceCommunicator, Request, ServiceCredential, ServiceName};
pub use utils::error::{FailureCause, Result, ServiceError};
