//! Error types for Horizon Fetch core systems.

use std::fmt;

/// The main error type for core operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The connection ID is invalid or has already been disconnected.
    InvalidConnection,
    /// The task ID is unknown or the task has already run.
    InvalidTask,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConnection => write!(f, "Invalid or disconnected connection ID"),
            Self::InvalidTask => write!(f, "Unknown task ID or task already executed"),
        }
    }
}

impl std::error::Error for CoreError {}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
