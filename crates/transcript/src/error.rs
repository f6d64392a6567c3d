use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single strategy attempt failed.
///
/// These never leave the pipeline; they are logged and the next strategy runs.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("No transcript data found: {0}")]
    NotFound(String),
    #[error("Caption fetch failed: {0}")]
    Network(String),
    #[error("Caption fetch returned status {0}")]
    Status(u16),
    #[error("Caption fetch timed out")]
    Timeout,
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Page affordance missing: {0}")]
    MissingAffordance(String),
    #[error("No video identifier could be resolved")]
    MissingVideoId,
}

impl AcquisitionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AcquisitionError::NotFound(_)
            | AcquisitionError::MissingAffordance(_)
            | AcquisitionError::MissingVideoId => ErrorKind::NotFound,
            AcquisitionError::Network(_) | AcquisitionError::Status(_) | AcquisitionError::Timeout => {
                ErrorKind::NetworkError
            }
            AcquisitionError::Parse(_) => ErrorKind::ParseError,
        }
    }
}

impl From<serde_json::Error> for AcquisitionError {
    fn from(err: serde_json::Error) -> Self {
        AcquisitionError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for AcquisitionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AcquisitionError::Timeout
        } else if let Some(status) = err.status() {
            AcquisitionError::Status(status.as_u16())
        } else {
            AcquisitionError::Network(err.to_string())
        }
    }
}

/// Caller-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    NetworkError,
    ParseError,
}
