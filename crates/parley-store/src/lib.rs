pub mod bootstrap;
pub mod credentials;
pub mod error;
pub mod message_log;
pub mod rooms;

pub use bootstrap::Bootstrap;
pub use credentials::CredentialStore;
pub use error::StoreError;
pub use message_log::MessageLog;
pub use rooms::RoomRegistry;
