pub mod error;
pub mod routes;
pub mod service;

pub use error::Rejection;
pub use routes::router;
pub use service::{AppState, ChatService};
