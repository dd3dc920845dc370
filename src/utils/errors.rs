use std::path::PathBuf;
use thiserror::Error;

/// Main error type for pixup
#[derive(Error, Debug)]
pub enum PixupError {
    /// A required local field is missing, e.g. an empty gallery name
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The gallery is not in a state that allows the operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The remote service answered with a non-200 status
    #[error("{operation} failed with HTTP status {status}")]
    RemoteError { operation: &'static str, status: u16 },

    /// HTTP 200 but the body did not carry the expected fields
    #[error("Unexpected response from {operation}: {reason}")]
    ProtocolError {
        operation: &'static str,
        reason: String,
    },

    #[error("IO error on {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request never produced a response
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PixupError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// HTTP status carried by a remote failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PixupError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PixupError>;
