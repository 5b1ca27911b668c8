//! Repopulates a reservation form's equipment dropdown whenever its room
//! dropdown changes, from the server's `available_pcs` listing.

pub mod config;
pub mod control;
pub mod error;
pub mod render;
pub mod source;
mod synchronizer;

pub use control::{EquipmentControl, RoomControl, SelectControl};
pub use error::FetchError;
pub use render::{EquipmentState, OptionEntry, RenderedKind};
pub use source::{HttpPcSource, PcSource};
pub use synchronizer::{DropdownSynchronizer, PendingChange, SyncOutcome};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
