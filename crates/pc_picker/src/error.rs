use shared::error::ServerRejection;
use thiserror::Error;

/// Why a list of PCs could not be obtained.
///
/// The variants exist for diagnostics only. The equipment control shows the
/// same "Error loading PCs" entry for all of them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Status(#[from] ServerRejection),
    #[error("invalid available_pcs payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("invalid client configuration: {reason}")]
    Config { reason: String },
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
            Self::InvalidServerUrl { .. } => "invalid_server_url",
            Self::Config { .. } => "config",
        }
    }
}
