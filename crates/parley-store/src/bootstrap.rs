use std::path::Path;

use tracing::info;

use parley_types::models::{RoomList, UserList};

use crate::{CredentialStore, RoomRegistry, StoreError};

/// Seed data the server starts from: the user roster and the room list.
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    pub users: UserList,
    pub rooms: RoomList,
}

impl Bootstrap {
    /// Read both seed files from disk.
    pub fn load(users_path: &Path, rooms_path: &Path) -> Result<Self, StoreError> {
        info!("Loading user list from {}", users_path.display());
        let users_json = read(users_path)?;

        info!("Loading room list from {}", rooms_path.display());
        let rooms_json = read(rooms_path)?;

        Self::from_json(&users_json, &rooms_json)
    }

    pub fn from_json(users_json: &str, rooms_json: &str) -> Result<Self, StoreError> {
        let users: UserList = serde_json::from_str(users_json)
            .map_err(|source| StoreError::Json { what: "users", source })?;
        let rooms: RoomList = serde_json::from_str(rooms_json)
            .map_err(|source| StoreError::Json { what: "rooms", source })?;

        info!("Loaded {} users and {} rooms", users.users.len(), rooms.rooms.len());
        Ok(Self { users, rooms })
    }

    pub fn into_parts(self) -> (CredentialStore, RoomRegistry) {
        (
            CredentialStore::new(self.users.users),
            RoomRegistry::new(self.rooms.rooms),
        )
    }
}

fn read(path: &Path) -> Result<String, StoreError> {
    std::fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })
}
