pub mod auth;
pub mod flight;
pub mod notification;
pub mod user;

pub use auth::AuthConnector;
pub use flight::FlightConnector;
pub use notification::NotificationConnector;
pub use user::UserConnector;
