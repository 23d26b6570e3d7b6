//! Core error types for catnap-core.
//!
//! Errors are split by recovery strategy: configuration problems are
//! recovered by substituting defaults, display problems are reported and
//! skipped, and command problems are reported back to the user. None of
//! them is allowed to escape a timer callback.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for catnap-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Display backend errors
    #[error("Display error: {0}")]
    Display(#[from] DisplayError),

    /// A command was issued in a state where it does not apply
    #[error("{0}")]
    Command(#[from] CommandError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The configuration directory cannot be determined or created
    #[error("Cannot prepare configuration directory: {0}")]
    DirUnavailable(String),
}

/// Display-surface errors.
///
/// These are always caught at the callback boundary; a failing surface
/// never stops the timers.
#[derive(Error, Debug)]
pub enum DisplayError {
    /// Image file does not exist
    #[error("Image not found: {path}")]
    NotFound { path: PathBuf },

    /// Image file exists but cannot be decoded
    #[error("Cannot decode image {path}: {message}")]
    DecodeFailed { path: PathBuf, message: String },

    /// The active surface does not support the requested operation
    #[error("Surface does not support {operation}")]
    Unsupported { operation: &'static str },

    /// The rendering backend failed
    #[error("Backend failure: {0}")]
    Backend(String),
}

impl From<std::io::Error> for DisplayError {
    fn from(err: std::io::Error) -> Self {
        DisplayError::Backend(err.to_string())
    }
}

/// Errors for commands issued in the wrong session state.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// `delay` / `stopbreak` outside of a break
    #[error("Not currently in a break.")]
    NotOnBreak,

    /// A break was requested while the session is idle
    #[error("Pomodoro is not running.")]
    NotRunning,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
