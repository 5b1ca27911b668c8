//! What the equipment control shows for each stage of a room change.

use shared::protocol::PcOption;

use crate::error::FetchError;

pub const LOADING_LABEL: &str = "Loading PCs...";
pub const EMPTY_LABEL: &str = "No PCs available";
pub const ERROR_LABEL: &str = "Error loading PCs";

/// One `<option>` of the equipment control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub value: Option<String>,
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
}

impl OptionEntry {
    /// A disabled, pre-selected entry carrying only a status label.
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            value: None,
            label: label.into(),
            disabled: true,
            selected: true,
        }
    }

    pub fn pc(pc: &PcOption) -> Self {
        Self {
            value: Some(pc.id.to_string()),
            label: pc.name.clone(),
            disabled: false,
            selected: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.value.is_none() && self.disabled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipmentState {
    Loading,
    Populated(Vec<PcOption>),
    Empty,
    Error,
}

/// Discriminant of [`EquipmentState`] without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedKind {
    Loading,
    Populated { count: usize },
    Empty,
    Error,
}

impl EquipmentState {
    /// Terminal state for a settled fetch.
    pub fn from_fetch(result: &Result<Vec<PcOption>, FetchError>) -> Self {
        match result {
            Ok(pcs) if pcs.is_empty() => Self::Empty,
            Ok(pcs) => Self::Populated(pcs.clone()),
            Err(_) => Self::Error,
        }
    }

    pub fn kind(&self) -> RenderedKind {
        match self {
            Self::Loading => RenderedKind::Loading,
            Self::Populated(pcs) => RenderedKind::Populated { count: pcs.len() },
            Self::Empty => RenderedKind::Empty,
            Self::Error => RenderedKind::Error,
        }
    }

    pub fn entries(&self) -> Vec<OptionEntry> {
        match self {
            Self::Loading => vec![OptionEntry::placeholder(LOADING_LABEL)],
            Self::Populated(pcs) => pcs.iter().map(OptionEntry::pc).collect(),
            Self::Empty => vec![OptionEntry::placeholder(EMPTY_LABEL)],
            Self::Error => vec![OptionEntry::placeholder(ERROR_LABEL)],
        }
    }
}
