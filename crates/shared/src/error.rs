use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 422 => Self::Validation,
            _ => Self::Internal,
        }
    }
}

/// A non-success HTTP answer from the reservation server.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("server answered {status} ({code:?}) for {path}")]
pub struct ServerRejection {
    pub status: u16,
    pub code: ErrorCode,
    pub path: String,
}

impl ServerRejection {
    pub fn new(status: u16, path: impl Into<String>) -> Self {
        Self {
            status,
            code: ErrorCode::from_status(status),
            path: path.into(),
        }
    }
}
