//! Seams between the synchronizer and the two selection controls it drives.

use std::sync::{Arc, Mutex, MutexGuard};

use shared::domain::RoomId;

use crate::render::OptionEntry;

pub const ROOM_CONTROL_ID: &str = "room_id";
pub const EQUIPMENT_CONTROL_ID: &str = "equipment_id";

/// The room selection input. Only its current value is read.
pub trait RoomControl: Send + Sync {
    fn value(&self) -> RoomId;
}

/// The equipment selection input. Its option list is owned by the synchronizer.
pub trait EquipmentControl: Send + Sync {
    /// Called with the synchronizer's render lock held. Reading its state
    /// (e.g. `latest_sequence`) is fine; starting a new change from here is not.
    fn replace_options(&self, entries: Vec<OptionEntry>);
    fn options(&self) -> Vec<OptionEntry>;
}

#[derive(Debug, Default)]
struct SelectState {
    value: String,
    options: Vec<OptionEntry>,
}

/// In-memory selection control. Clones share the same underlying control.
#[derive(Debug, Clone)]
pub struct SelectControl {
    name: Arc<str>,
    state: Arc<Mutex<SelectState>>,
}

impl SelectControl {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            state: Arc::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Changes the value without firing a change signal.
    pub fn set_value(&self, value: impl Into<String>) {
        self.lock().value = value.into();
    }

    fn lock(&self) -> MutexGuard<'_, SelectState> {
        // Writers never panic while holding the lock, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RoomControl for SelectControl {
    fn value(&self) -> RoomId {
        RoomId(self.lock().value.clone())
    }
}

impl EquipmentControl for SelectControl {
    fn replace_options(&self, entries: Vec<OptionEntry>) {
        self.lock().options = entries;
    }

    fn options(&self) -> Vec<OptionEntry> {
        self.lock().options.clone()
    }
}
