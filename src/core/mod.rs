pub mod communicator;
pub mod connector;
pub mod request;
pub mod route;
pub mod services;

pub use crate::domain::model::{Delivery, Notification, ReceiverType};
pub use crate::domain::ports::{MessageQueue, NotificationProvider, TransportClient};
pub use crate::utils::error::Result;
pub use communicator::{InterserviceCommunicator, ServiceCredential};
pub use connector::{Connector, ServiceName};
pub use request::Request;
