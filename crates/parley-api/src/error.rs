use thiserror::Error;

/// Business-level reasons a request is turned down. These are reported to
/// the caller inside a `Reply`, never as transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Wrong Username or Password")]
    InvalidCredentials,

    #[error("No such room")]
    NoSuchRoom,
}
