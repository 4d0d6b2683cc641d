use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not complete: connection refused or lost, deadline exceeded.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server turned the request down; carries its reason.
    #[error("{0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sync controller is no longer running")]
    SyncClosed,

    #[error("sync task failed: {0}")]
    SyncTask(#[from] tokio::task::JoinError),
}
