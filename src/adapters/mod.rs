// Adapters layer: concrete implementations of the domain ports (http transport, mail relay,
// user directory, password hashing, message queue).

pub mod directory;
pub mod hasher;
pub mod http;
pub mod mail;
pub mod queue;

pub use directory::UserServiceDirectory;
pub use hasher::AuthServicePasswordHasher;
pub use http::ReqwestTransport;
pub use mail::HttpMailTransport;
pub use queue::{DeadLetter, InMemoryQueue};
