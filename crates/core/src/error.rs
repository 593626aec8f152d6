// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Process error: {0}")]
    Process(#[from] crate::port::ProcessError),

    #[error("Module '{0}' is not installed")]
    ModuleNotInstalled(String),

    #[error("Environment variable resolution failed: {0}")]
    EnvVars(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Module name carried by a `ModuleNotInstalled` error, if any.
    pub fn missing_module(&self) -> Option<&str> {
        match self {
            AppError::ModuleNotInstalled(name) => Some(name),
            _ => None,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
