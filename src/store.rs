use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::room::RoomState;

/// Latest state per room, shared by every request handler.
///
/// States are stored behind `Arc` and replaced wholesale, so a reader holds
/// either the previous state or the new one, never a mix.
#[derive(Debug, Default)]
pub struct RoomStateStore {
    rooms: RwLock<HashMap<String, Arc<RoomState>>>,
}

impl RoomStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, room_id: &str) -> Option<Arc<RoomState>> {
        let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner);
        rooms.get(room_id).cloned()
    }

    pub fn set(&self, room_id: impl Into<String>, state: RoomState) {
        let state = Arc::new(state);
        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        rooms.insert(room_id.into(), state);
    }

    pub fn rooms(&self) -> Vec<String> {
        let rooms = self.rooms.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = rooms.keys().cloned().collect();
        ids.sort();
        ids
    }
}
