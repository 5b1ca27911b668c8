use serde::{Deserialize, Serialize};

use crate::domain::PcId;

/// One element of the `available_pcs` response array.
///
/// Both fields are required; extra fields sent by the server are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcOption {
    pub id: PcId,
    pub name: String,
}

impl PcOption {
    pub fn new(id: impl Into<PcId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

pub type AvailablePcsResponse = Vec<PcOption>;

/// Path of the endpoint listing the PCs of a room, relative to the server root.
pub fn available_pcs_path(room_id: &str) -> String {
    format!("/admin/rooms/{room_id}/available_pcs")
}
