use parley_types::api::Room;

/// Set of valid room names, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
}

impl RoomRegistry {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.rooms.iter().any(|r| r.name == name)
    }

    /// All registered rooms, in bootstrap order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }
}
