use serde::{Deserialize, Serialize};

use crate::api::Room;

/// A registered account. `password` holds the SHA-256 hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

/// Shape of the users bootstrap file: `{"users": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<User>,
}

/// Shape of the rooms bootstrap file: `{"rooms": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomList {
    #[serde(default)]
    pub rooms: Vec<Room>,
}
