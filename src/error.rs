use std::io;
use thiserror::Error;

/// Custom error type for the tray monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The monitor page could not be fetched
    #[error("Network error: {0}")]
    Transport(String),

    /// The page was fetched but no device rows were recovered
    #[error("No printer rows were parsed. The page layout may have changed.")]
    EmptyExtraction,

    #[error("A scan is already in progress")]
    ScanInProgress,

    #[error("Export failed: {0}")]
    Export(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the tray monitor
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        MonitorError::Transport(msg.into())
    }

    pub fn export<S: Into<String>>(msg: S) -> Self {
        MonitorError::Export(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        MonitorError::Other(msg.into())
    }

    /// True for the failures that abort a scan before any state is touched
    pub fn is_scan_failure(&self) -> bool {
        matches!(
            self,
            MonitorError::Transport(_) | MonitorError::EmptyExtraction
        )
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        MonitorError::Transport(err.to_string())
    }
}

impl From<csv::Error> for MonitorError {
    fn from(err: csv::Error) -> Self {
        MonitorError::Export(err.to_string())
    }
}
