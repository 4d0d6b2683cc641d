use serde::{Deserialize, Serialize};

// -- Credentials --

/// Credential pair sent with every request. `password` is the SHA-256 hex
/// digest of the user's password, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCred {
    pub username: String,
    pub password: String,
}

impl UserCred {
    /// Build a credential from a plaintext password, hashing it on the way in.
    pub fn from_plaintext(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password: crate::auth::hash_password(password),
        }
    }
}

// -- Rooms --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinRoomRequest {
    pub room: String,
    pub cred: UserCred,
}

// -- Messages --

/// A message as delivered to clients. `index` is its position in the
/// server's global log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub index: u64,
    pub room: String,
    pub sender: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostMessageRequest {
    pub room: String,
    pub cred: UserCred,
    pub text: String,
}

/// Half-open range `[start_index, end_index)` of the global log, filtered to
/// one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchMessagesRequest {
    pub room: String,
    pub cred: UserCred,
    pub start_index: u64,
    pub end_index: u64,
}

// -- Replies --

/// Business-level outcome of a request. Rejections travel in this shape,
/// never as transport faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub is_success: bool,
    pub message: String,
}

impl Reply {
    pub fn success(message: impl Into<String>) -> Self {
        Self { is_success: true, message: message.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { is_success: false, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountReply {
    pub is_success: bool,
    pub count: u64,
    pub message: String,
}
